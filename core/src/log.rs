//! Logging shims: forwards to `tracing` when the feature is on, discards everything otherwise.

#[cfg(feature = "tracing")]
macro_rules! debug {
    ($($t: tt)*) => { tracing::debug!($($t)*) };
}

#[cfg(feature = "tracing")]
macro_rules! info {
    ($($t: tt)*) => { tracing::info!($($t)*) };
}

#[cfg(feature = "tracing")]
macro_rules! warn {
    ($($t: tt)*) => { tracing::warn!($($t)*) };
}

// Arguments are still type-checked so that values only logged do not turn into unused warnings.
#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($t: tt)*) => {
        if false {
            let _ = format_args!($($t)*);
        }
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! info {
    ($($t: tt)*) => {
        if false {
            let _ = format_args!($($t)*);
        }
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! warn {
    ($($t: tt)*) => {
        if false {
            let _ = format_args!($($t)*);
        }
    };
}
