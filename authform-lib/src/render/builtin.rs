//! Minimal HTML fallbacks used when the host supplies no component.

use std::fmt::Write;

use super::ButtonProps;
use super::ButtonRenderer;
use super::FileProps;
use super::FileRenderer;
use super::Markup;
use super::SelectProps;
use super::SelectRenderer;
use super::TextProps;
use super::TextRenderer;
use crate::field::FieldKind;

/// Placeholder option shown first in built-in dropdowns.
pub const SELECT_PLACEHOLDER: &str = "Select";

/// Plain HTML rendering for every family.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinRenderer;

impl TextRenderer for BuiltinRenderer {
    fn render_text(&self, props: &TextProps) -> Markup {
        let mut html = String::from("<div>");
        let _ = write!(
            html,
            "<input type=\"{}\" name=\"{}\"",
            props.input_type.as_str(),
            escape(&props.name)
        );
        if let Some(placeholder) = &props.placeholder {
            let _ = write!(html, " placeholder=\"{}\"", escape(placeholder));
        }
        // Passwords are never echoed back into markup.
        if !props.value.is_empty() && props.input_type != FieldKind::Password {
            let _ = write!(html, " value=\"{}\"", escape(&props.value));
        }
        html.push_str("/>");
        push_error(&mut html, props.helper_text.as_deref());
        html.push_str("</div>");
        Markup::from(html)
    }
}

impl SelectRenderer for BuiltinRenderer {
    fn render_select(&self, props: &SelectProps) -> Markup {
        let mut html = String::from("<div>");
        if let Some(label) = &props.label {
            let _ = write!(html, "<label>{}</label>", escape(label));
        }
        let _ = write!(html, "<select name=\"{}\">", escape(&props.name));
        let _ = write!(html, "<option value=\"\">{SELECT_PLACEHOLDER}</option>");
        for option in &props.options {
            let selected = if option == props.controller.value() {
                " selected"
            } else {
                ""
            };
            let option = escape(option);
            let _ = write!(html, "<option value=\"{option}\"{selected}>{option}</option>");
        }
        html.push_str("</select>");
        push_error(&mut html, props.helper_text.as_deref());
        html.push_str("</div>");
        Markup::from(html)
    }
}

impl FileRenderer for BuiltinRenderer {
    fn render_file(&self, props: &FileProps) -> Markup {
        let mut html = String::from("<div>");
        if let Some(label) = &props.label {
            let _ = write!(html, "<label>{}</label>", escape(label));
        }
        let _ = write!(html, "<input type=\"file\" name=\"{}\"", escape(&props.name));
        if let Some(accept) = &props.accept {
            let _ = write!(html, " accept=\"{}\"", escape(accept));
        }
        html.push_str("/></div>");
        Markup::from(html)
    }
}

impl ButtonRenderer for BuiltinRenderer {
    fn render_button(&self, props: &ButtonProps) -> Markup {
        let disabled = if props.is_loading { " disabled" } else { "" };
        Markup::from(format!(
            "<button type=\"submit\"{disabled}>{}</button>",
            escape(&props.label)
        ))
    }
}

fn push_error(html: &mut String, message: Option<&str>) {
    if let Some(message) = message {
        let _ = write!(html, "<p style=\"color: red\">{}</p>", escape(message));
    }
}

/// Escapes text for use in HTML content and attribute values.
pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ChangeHandler;
    use crate::render::SelectController;

    fn text_props(kind: FieldKind, value: &str, error: Option<&str>) -> TextProps {
        TextProps {
            name: "field".into(),
            input_type: kind,
            placeholder: Some("Type here".into()),
            value: value.into(),
            error: error.is_some(),
            helper_text: error.map(String::from),
            full_width: true,
            on_change: ChangeHandler::noop("field"),
        }
    }

    #[test]
    fn test_text_input_with_error() {
        let markup = BuiltinRenderer.render_text(&text_props(
            FieldKind::Email,
            "a@",
            Some("Invalid email format"),
        ));
        assert_eq!(
            markup.as_str(),
            "<div><input type=\"email\" name=\"field\" placeholder=\"Type here\" value=\"a@\"/>\
             <p style=\"color: red\">Invalid email format</p></div>"
        );
    }

    #[test]
    fn test_password_value_is_not_rendered() {
        let markup = BuiltinRenderer.render_text(&text_props(FieldKind::Password, "hunter22", None));
        assert!(!markup.as_str().contains("hunter22"));
    }

    #[test]
    fn test_select_has_leading_placeholder() {
        let props = SelectProps {
            name: "plan".into(),
            label: Some("Plan".into()),
            options: vec!["free".into(), "pro".into()],
            error: false,
            helper_text: None,
            controller: SelectController::new("pro", None, ChangeHandler::noop("plan")),
        };
        assert_eq!(
            BuiltinRenderer.render_select(&props).as_str(),
            "<div><label>Plan</label><select name=\"plan\"><option value=\"\">Select</option>\
             <option value=\"free\">free</option><option value=\"pro\" selected>pro</option>\
             </select></div>"
        );
    }

    #[test]
    fn test_file_input_is_bare() {
        let props = FileProps {
            name: "avatar".into(),
            label: Some("Avatar".into()),
            error: true,
            helper_text: Some("Avatar is required".into()),
            accept: Some("image/jpeg,image/png".into()),
            file_name: None,
            preview: None,
            on_change: ChangeHandler::noop("avatar"),
        };
        assert_eq!(
            BuiltinRenderer.render_file(&props).as_str(),
            "<div><label>Avatar</label><input type=\"file\" name=\"avatar\" \
             accept=\"image/jpeg,image/png\"/></div>"
        );
    }

    #[test]
    fn test_button_disabled_while_loading() {
        let markup = BuiltinRenderer.render_button(&ButtonProps {
            is_loading: true,
            label: "Processing...".into(),
        });
        assert_eq!(
            markup.as_str(),
            "<button type=\"submit\" disabled>Processing...</button>"
        );
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
