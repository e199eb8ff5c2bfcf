/// Build [`Fields`](crate::value::Fields) from `key => value` pairs.
///
/// ```
/// use templated_log::fields;
///
/// let f = fields! { "user_id" => 12345, "location" => "Salzburg" };
/// assert_eq!(f.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::value::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::value::Fields::new();
        $(
            fields.insert(
                ::std::string::String::from($key),
                $crate::value::LogValue::from($value),
            );
        )+
        fields
    }};
}

/// Build a call argument list, converting each argument into a
/// [`LogValue`](crate::value::LogValue).
///
/// ```
/// use templated_log::args;
///
/// let a = args!["User {user_id} logged in from {location}", 12345, "Salzburg"];
/// assert_eq!(a.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        ::std::vec![$($crate::value::LogValue::from($arg)),*]
    };
}
