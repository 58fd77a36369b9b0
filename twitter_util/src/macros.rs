#[macro_export]
macro_rules! opt {
    (, $default:ident) => {
        $default
    };
    ($optional:expr, $default:ident) => {
        $optional
    };
}

#[macro_export]
macro_rules! params_internal {
    ($vec:ident, required, $key:expr, $val:expr) => {
        $vec.push(($key, $val.to_string()));
    };
    ($vec:ident, optional, $key:expr, $val:expr) => {
        if let Some(ref v) = $val {
            $vec.push(($key, v.to_string()));
        }
    };
}

/// Build request params (query string or form body) for API endpoints.
///
/// `required` params are always pushed, `optional` params only when they are `Some`.
/// The key is the identifier itself, the value defaults to the variable of the same name.
/// ```
/// use twitter_util::build_params;
///
/// let status = "hello";
/// let page: Option<u32> = None;
/// let params = build_params! {
///     required status,
///     optional page,
///     required rpp => 20,
/// };
/// assert_eq!(params, vec![
///     ("status".to_string(), "hello".to_string()),
///     ("rpp".to_string(), "20".to_string()),
/// ]);
/// ```
#[macro_export]
macro_rules! build_params {
    (
        $(
            $kind:ident $name:ident $( => $val:expr )?
        ),+ $(,)?
    ) => {
        {
            let mut params: Vec<(String, String)> = Vec::new();
            $(
                $crate::params_internal!(
                    params,
                    $kind,
                    stringify!($name).to_string(),
                    $crate::opt!($( $val )?, $name)
                );
            )+
            params
        }
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn optional_params_are_skipped_when_none() {
        let since_id: Option<i64> = None;
        let lang = Some("en");
        let params = build_params! {
            required q => "rust",
            optional since_id,
            optional lang,
        };
        assert_eq!(
            params,
            vec![
                ("q".to_string(), "rust".to_string()),
                ("lang".to_string(), "en".to_string()),
            ]
        );
    }
}
