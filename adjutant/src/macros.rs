/// Creates a single text [`Content`](crate::Content) from a role shorthand.
///
/// ```rust
/// use adjutant::{Role, adj_content};
///
/// let content = adj_content!(model => "Done.");
/// assert_eq!(content.role, Role::Model);
/// assert_eq!(content.text().as_deref(), Some("Done."));
/// ```
#[macro_export]
macro_rules! adj_content {
    (system => $text:expr $(,)?) => {
        $crate::Content::from_text($crate::Role::System, $text)
    };
    (user => $text:expr $(,)?) => {
        $crate::Content::from_text($crate::Role::User, $text)
    };
    (model => $text:expr $(,)?) => {
        $crate::Content::from_text($crate::Role::Model, $text)
    };
    ($role:ident => $text:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, or model");
    };
}

/// Creates a `Vec<Content>` from role/text pairs.
///
/// ```rust
/// use adjutant::{Role, adj_contents};
///
/// let contents = adj_contents![
///     user => "What is 2 + 3?",
///     model => "5",
/// ];
///
/// assert_eq!(contents.len(), 2);
/// assert_eq!(contents[0].role, Role::User);
/// assert_eq!(contents[1].role, Role::Model);
/// ```
#[macro_export]
macro_rules! adj_contents {
    () => {
        Vec::<$crate::Content>::new()
    };
    ($($role:ident => $text:expr),+ $(,)?) => {
        vec![$($crate::adj_content!($role => $text)),+]
    };
}
