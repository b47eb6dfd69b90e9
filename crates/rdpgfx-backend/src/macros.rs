/// Creates a `BackendError` with `General` kind
///
/// Shorthand for
/// ```rust
/// <crate::BackendError as crate::BackendErrorExt>::general(context)
/// ```
#[macro_export]
macro_rules! general_err {
    ( $context:expr $(,)? ) => {{
        <$crate::BackendError as $crate::BackendErrorExt>::general($context)
    }};
}

/// Creates a `BackendError` with `Reason` kind
///
/// Shorthand for
/// ```rust
/// <crate::BackendError as crate::BackendErrorExt>::reason(context, reason)
/// ```
#[macro_export]
macro_rules! reason_err {
    ( $context:expr, $($arg:tt)* ) => {{
        <$crate::BackendError as $crate::BackendErrorExt>::reason($context, format!($($arg)*))
    }};
}

/// Creates a `BackendError` with `Custom` kind and a source error attached to it
///
/// Shorthand for
/// ```rust
/// <crate::BackendError as crate::BackendErrorExt>::custom(context, source)
/// ```
#[macro_export]
macro_rules! custom_err {
    ( $context:expr, $source:expr $(,)? ) => {{
        <$crate::BackendError as $crate::BackendErrorExt>::custom($context, $source)
    }};
}

/// Creates a `BackendError` with `Allocation` kind and the allocator error attached to it
///
/// Shorthand for
/// ```rust
/// <crate::BackendError as crate::BackendErrorExt>::allocation(context, source)
/// ```
#[macro_export]
macro_rules! alloc_err {
    ( $context:expr, $source:expr $(,)? ) => {{
        <$crate::BackendError as $crate::BackendErrorExt>::allocation($context, $source)
    }};
}
