use crate::format::placeholders;
use crate::value::{Fields, LogValue};

/// Fill placeholders that neither `bindings` nor `data` resolve with the
/// residual arguments, in the order the placeholders appear in `template`.
///
/// Each unresolved name consumes one argument and is inserted into `data`;
/// a name that repeats in the template is filled once. Arguments beyond the
/// number of unresolved placeholders are returned untouched, in order.
pub fn match_residual<'a>(
    template: &str,
    bindings: &Fields,
    data: &mut Fields,
    residual: Vec<&'a LogValue>,
) -> Vec<&'a LogValue> {
    let mut remaining = residual.into_iter();

    for name in placeholders(template) {
        if data.contains_key(name) || bindings.contains_key(name) {
            continue;
        }
        match remaining.next() {
            Some(value) => {
                data.insert(name.to_string(), value.clone());
            }
            None => break,
        }
    }

    remaining.collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_in_placeholder_order() {
        let args = [LogValue::from(12345), LogValue::from("Salzburg")];
        let mut data = Fields::new();
        let left = match_residual(
            "User {user_id} logged in from {location}",
            &Fields::new(),
            &mut data,
            args.iter().collect(),
        );
        assert!(left.is_empty());
        assert_eq!(data["user_id"], LogValue::from(12345));
        assert_eq!(data["location"], LogValue::from("Salzburg"));
    }

    #[test]
    fn skips_names_already_resolved() {
        let args = [LogValue::from("Salzburg")];
        let mut data = Fields::new();
        data.insert("user_id".into(), 1.into());
        let mut bindings = Fields::new();
        bindings.insert("app".into(), "api".into());
        let left = match_residual(
            "{app}: {user_id} from {location}",
            &bindings,
            &mut data,
            args.iter().collect(),
        );
        assert!(left.is_empty());
        assert_eq!(data.len(), 2);
        assert_eq!(data["location"], LogValue::from("Salzburg"));
        assert!(!data.contains_key("app"));
    }

    #[test]
    fn extra_arguments_are_returned() {
        let args = [LogValue::from(1), LogValue::from(2), LogValue::from(3)];
        let mut data = Fields::new();
        let left = match_residual("{a}", &Fields::new(), &mut data, args.iter().collect());
        assert_eq!(left, vec![&args[1], &args[2]]);
        assert_eq!(data["a"], LogValue::from(1));
    }

    #[test]
    fn extra_placeholders_stay_unfilled() {
        let args = [LogValue::from(1)];
        let mut data = Fields::new();
        let left = match_residual("{a} {b} {a}", &Fields::new(), &mut data, args.iter().collect());
        assert!(left.is_empty());
        assert_eq!(data.len(), 1);
        assert!(!data.contains_key("b"));
    }

    #[test]
    fn repeated_name_consumes_once() {
        let args = [LogValue::from("x"), LogValue::from("y")];
        let mut data = Fields::new();
        let left = match_residual("{a} {a} {b}", &Fields::new(), &mut data, args.iter().collect());
        assert!(left.is_empty());
        assert_eq!(data["a"], LogValue::from("x"));
        assert_eq!(data["b"], LogValue::from("y"));
    }
}
