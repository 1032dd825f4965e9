/// A very simple profiling tool.
///
/// Note: don't ever profile code that has not been compiled in
/// release mode.  There can be orders of magnitude difference in
/// execution time between it and debug mode!
///
/// This macro measures the wall time it takes to execute the block.
/// If the time is at least $ms_threshold (in milli-seconds), then it
/// logs it at the debug level, prefixed with label.
///
/// ```nocompile
/// let cert = time_it!("Generating a key", 10, {
///     generate_cert(&identity, cipher_suite)?
/// });
/// ```
macro_rules! time_it {
    ( $label:expr, $ms_threshold:expr, $body:expr ) => {{
        use std::time::{SystemTime, Duration};

        // We use drop so that code that uses non-local exits (e.g.,
        // `?`) still gets timed.
        struct Timer<'a> {
            label: &'a str,
            start: SystemTime,
        }
        impl Drop for Timer<'_> {
            fn drop(&mut self) {
                let elapsed = self.start.elapsed();
                if elapsed.clone().unwrap_or(Duration::from_millis($ms_threshold))
                    >= Duration::from_millis($ms_threshold)
                {
                    log::debug!("{}: {:?}", self.label, elapsed);
                }
            }
        }

        let label = $label;
        let _start = Timer { label: &label, start: SystemTime::now() };
        $body
    }};
    ( $label:expr, $body:expr ) => {
        time_it!($label, 0, $body)
    };
}
