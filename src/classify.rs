use crate::error_info::ErrorInfo;
use crate::value::{ArgKind, Fields, LogValue};

/// Normalized view of a log call's arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified<'a> {
    /// The uninterpolated message template.
    pub template: &'a str,
    /// Call-site structured data gathered from leading data objects.
    pub structured: Fields,
    /// First error argument found among the leading arguments.
    pub error: Option<ErrorInfo>,
    /// Arguments not consumed by classification, in original order.
    pub residual: Vec<&'a LogValue>,
}

/// Outcome of classifying a call.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification<'a> {
    Templated(Classified<'a>),
    /// No template at position 0 or 1: the call is left to the host's own
    /// formatting, without augmentation.
    PassThrough,
}

impl<'a> Classification<'a> {
    pub fn templated(self) -> Option<Classified<'a>> {
        match self {
            Classification::Templated(c) => Some(c),
            Classification::PassThrough => None,
        }
    }
}

/// Read-only cursor over the call arguments.
struct Cursor<'a> {
    args: &'a [LogValue],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(args: &'a [LogValue]) -> Self {
        Self { args, pos: 0 }
    }

    fn peek(&self, offset: usize) -> Option<&'a LogValue> {
        self.args.get(self.pos + offset)
    }

    fn kind_at(&self, offset: usize) -> Option<ArgKind> {
        self.peek(offset).map(LogValue::kind)
    }

    fn advance(&mut self) -> Option<&'a LogValue> {
        let value = self.args.get(self.pos)?;
        self.pos += 1;
        Some(value)
    }

    fn rest(&self) -> Vec<&'a LogValue> {
        self.args[self.pos.min(self.args.len())..].iter().collect()
    }
}

/// Accumulates data objects and the error while walking leading arguments.
#[derive(Default)]
struct Collected {
    structured: Fields,
    error: Option<ErrorInfo>,
}

impl Collected {
    /// Absorb a data object or error. Keys already present win, and so
    /// does an error already found.
    fn absorb(&mut self, value: &LogValue) {
        match value.kind() {
            ArgKind::Error => {
                if self.error.is_none() {
                    self.error = value.as_error().cloned();
                }
            }
            ArgKind::Data => {
                if let Some(fields) = value.to_fields() {
                    for (k, v) in fields {
                        self.structured.entry(k).or_insert(v);
                    }
                }
            }
            ArgKind::Template | ArgKind::Unknown => {}
        }
    }
}

fn is_object_or_error(kind: Option<ArgKind>) -> bool {
    matches!(kind, Some(ArgKind::Data) | Some(ArgKind::Error))
}

/// Decide which argument is the template, which carry structured data,
/// which is the error, and which are left over.
///
/// Accepted shapes:
/// - `template, [object | error], rest..`
/// - `object | error, template, [object | error], [object | error], rest..`
///
/// In the second shape the objects after the template are the dedicated
/// data and take precedence over the leading context object. Anything else
/// is [`Classification::PassThrough`].
pub fn classify(args: &[LogValue]) -> Classification<'_> {
    let mut cursor = Cursor::new(args);
    let mut collected = Collected::default();

    match (cursor.kind_at(0), cursor.kind_at(1)) {
        (Some(ArgKind::Template), _) => {
            let template = match cursor.advance().and_then(LogValue::as_str) {
                Some(t) => t,
                None => return Classification::PassThrough,
            };
            if is_object_or_error(cursor.kind_at(0)) {
                if let Some(value) = cursor.advance() {
                    collected.absorb(value);
                }
            }
            finish(template, collected, &cursor)
        }
        (Some(ArgKind::Data), Some(ArgKind::Template))
        | (Some(ArgKind::Error), Some(ArgKind::Template)) => {
            let pending = cursor.advance();
            let template = match cursor.advance().and_then(LogValue::as_str) {
                Some(t) => t,
                None => return Classification::PassThrough,
            };

            // An error in the leading position is found first.
            if let Some(value) = pending.filter(|v| v.is_error()) {
                collected.absorb(value);
            }
            for _ in 0..2 {
                if !is_object_or_error(cursor.kind_at(0)) {
                    break;
                }
                if let Some(value) = cursor.advance() {
                    collected.absorb(value);
                }
            }
            // The leading context object only fills keys nobody else set.
            if let Some(value) = pending.filter(|v| !v.is_error()) {
                collected.absorb(value);
            }
            finish(template, collected, &cursor)
        }
        _ => Classification::PassThrough,
    }
}

fn finish<'a>(template: &'a str, collected: Collected, cursor: &Cursor<'a>) -> Classification<'a> {
    Classification::Templated(Classified {
        template,
        structured: collected.structured,
        error: collected.error,
        residual: cursor.rest(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: serde_json::Value) -> LogValue {
        LogValue::from(v)
    }

    fn boom() -> LogValue {
        ErrorInfo::new("Error", "boom").into()
    }

    #[test]
    fn template_first_then_one_object() {
        let args = vec![
            LogValue::from("hi {a}"),
            obj(json!({"a": 1})),
            obj(json!({"b": 2})),
        ];
        let c = classify(&args).templated().unwrap();
        assert_eq!(c.template, "hi {a}");
        assert_eq!(c.structured.len(), 1);
        assert_eq!(c.structured["a"], LogValue::from(1));
        assert_eq!(c.residual, vec![&args[2]]);
    }

    #[test]
    fn template_first_then_error() {
        let args = vec![LogValue::from("failed"), boom(), LogValue::from(3)];
        let c = classify(&args).templated().unwrap();
        assert_eq!(c.error.as_ref().map(|e| e.message.as_str()), Some("boom"));
        assert!(c.structured.is_empty());
        assert_eq!(c.residual, vec![&args[2]]);
    }

    #[test]
    fn template_only() {
        let args = vec![LogValue::from("plain")];
        let c = classify(&args).templated().unwrap();
        assert!(c.structured.is_empty());
        assert!(c.error.is_none());
        assert!(c.residual.is_empty());
    }

    #[test]
    fn dedicated_data_beats_leading_context() {
        let args = vec![
            obj(json!({"foo": "bar", "user_id": 9999})),
            LogValue::from("User {user_id}"),
            obj(json!({"user_id": 12345})),
        ];
        let c = classify(&args).templated().unwrap();
        assert_eq!(c.structured["user_id"], LogValue::from(12345));
        assert_eq!(c.structured["foo"], LogValue::from("bar"));
        assert!(c.residual.is_empty());
    }

    #[test]
    fn leading_error_then_template() {
        let args = vec![boom(), LogValue::from("failed {x}"), LogValue::from(1)];
        let c = classify(&args).templated().unwrap();
        assert_eq!(c.error.unwrap().message, "boom");
        assert!(c.structured.is_empty());
        assert_eq!(c.residual, vec![&args[2]]);
    }

    #[test]
    fn first_error_wins() {
        let args = vec![
            boom(),
            LogValue::from("failed"),
            ErrorInfo::new("Error", "second").into(),
        ];
        let c = classify(&args).templated().unwrap();
        assert_eq!(c.error.unwrap().message, "boom");
        assert!(c.residual.is_empty());
    }

    #[test]
    fn at_most_two_objects_after_template() {
        let args = vec![
            obj(json!({"a": 0})),
            LogValue::from("t"),
            obj(json!({"a": 1})),
            boom(),
            obj(json!({"c": 3})),
        ];
        let c = classify(&args).templated().unwrap();
        assert_eq!(c.structured["a"], LogValue::from(1));
        assert!(c.error.is_some());
        assert_eq!(c.residual, vec![&args[4]]);
    }

    #[test]
    fn earlier_trailing_object_wins() {
        let args = vec![
            obj(json!({"a": 0})),
            LogValue::from("t"),
            obj(json!({"a": 1})),
            obj(json!({"a": 2, "b": 2})),
        ];
        let c = classify(&args).templated().unwrap();
        assert_eq!(c.structured["a"], LogValue::from(1));
        assert_eq!(c.structured["b"], LogValue::from(2));
        assert!(c.error.is_none());
        assert!(c.residual.is_empty());
    }

    #[test]
    fn error_inside_object_is_not_promoted_here() {
        let mut fields = Fields::new();
        fields.insert("err".into(), ErrorInfo::new("Error", "inner").into());
        let args = vec![LogValue::from("t"), LogValue::from(fields)];
        let c = classify(&args).templated().unwrap();
        assert!(c.error.is_none());
        assert!(c.structured["err"].is_error());
    }

    #[test]
    fn unrecognized_shapes_pass_through() {
        assert_eq!(classify(&[]), Classification::PassThrough);
        assert_eq!(
            classify(&[LogValue::from(1), LogValue::from("x")]),
            Classification::PassThrough
        );
        assert_eq!(
            classify(&[obj(json!({"a": 1})), LogValue::from(2)]),
            Classification::PassThrough
        );
        assert_eq!(classify(&[obj(json!({"a": 1}))]), Classification::PassThrough);
    }

    #[test]
    fn input_is_left_untouched() {
        let args = vec![LogValue::from("{a}"), LogValue::from(1)];
        let before = args.clone();
        let _ = classify(&args);
        assert_eq!(args, before);
    }
}
