/// Runs each task once, logging its duration and result.
///
/// `cron_tasks! { task => (arg, ...), ... }`
#[macro_export]
macro_rules! cron_tasks {
    ($($t:path => ($($arg:expr),* $(,)?)),* $(,)?) => {
        $({
            const TASK_NAME: &str = const_str::convert_ascii_case!(upper_camel, stringify!($t));
            let now = std::time::Instant::now();
            tracing::debug!("Starting Task {TASK_NAME}");
            match ($t)($($arg),*).await {
                Ok(v) => tracing::debug!("Completed Task {TASK_NAME} in {:?} with result {v:?}", now.elapsed()),
                Err(e) => tracing::error!("Error occurred in {TASK_NAME}: {e:?}"),
            }
        })*
    };
}
