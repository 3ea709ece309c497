use crate::common::state::MessagingLimits;
use crate::repositories::connections::ConnectionRegistry;
use crate::repositories::messages::MessageStore;
use crate::repositories::presences::PresenceMirror;
use crate::repositories::users::UserDirectory;

pub trait Context: Sync + Send {
    fn messages(&self) -> &dyn MessageStore;
    fn users(&self) -> &dyn UserDirectory;
    fn connections(&self) -> &ConnectionRegistry;
    fn limits(&self) -> &MessagingLimits;
    /// `None` when the presence mirror is disabled.
    fn presences(&self) -> Option<&dyn PresenceMirror>;
}
