//! Shorthand for the two leaf effects reducers build most

/// `Effect::Future` from the body of an `async move` block
///
/// The body evaluates to `Option<Action>`.
///
/// ```rust,ignore
/// let api = Arc::clone(&env.api);
/// async_effect! {
///     Some(TodoAction::Loaded { result: api.list().await })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move { $($body)* }))
    };
}

/// `Effect::Delay` sending `action` once `duration` has passed
///
/// ```rust,ignore
/// delay! {
///     duration: env.error_dismiss,
///     action: TodoAction::ErrorExpired { generation }
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (duration: $duration:expr, action: $action:expr $(,)?) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}
