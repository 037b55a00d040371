//! Render plan: which component renders which field, with what props.

use std::collections::BTreeMap;

use super::builtin::escape;
use super::ButtonProps;
use super::ChangeHandler;
use super::FileProps;
use super::Markup;
use super::Renderers;
use super::SelectController;
use super::SelectProps;
use super::TextProps;
use crate::error::FieldError;
use crate::field::FieldDescriptor;
use crate::field::FieldFamily;
use crate::field::FieldValue;
use crate::field::FormConfiguration;
use crate::field::FormValues;
use crate::layout::FieldWidth;
use crate::layout::LayoutPlan;
use crate::schema::IMAGE_MIME_TYPES;

/// Family-specific props for one planned field.
#[derive(Debug, Clone)]
pub enum FieldSlot {
    /// Rendered by the text renderer.
    Text(TextProps),
    /// Rendered by the select renderer.
    Select(SelectProps),
    /// Rendered by the file renderer.
    File(FileProps),
}

/// One visible field with its resolved props.
#[derive(Debug, Clone)]
pub struct PlannedField {
    /// Field name.
    pub name: String,
    /// Family that selected the renderer.
    pub family: FieldFamily,
    /// Width from the layout plan.
    pub width: FieldWidth,
    /// Props for the renderer.
    pub slot: FieldSlot,
}

impl PlannedField {
    /// Renders the field with the matching family renderer.
    pub fn render(&self, renderers: &Renderers) -> Markup {
        match &self.slot {
            FieldSlot::Text(props) => renderers.text().render_text(props),
            FieldSlot::Select(props) => renderers.select().render_select(props),
            FieldSlot::File(props) => renderers.file().render_file(props),
        }
    }
}

/// Resolved rendering for every visible field of a form.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    layout: LayoutPlan,
    fields: Vec<PlannedField>,
}

impl RenderPlan {
    /// Resolves props for every visible field.
    ///
    /// Hidden fields are skipped. `handler` supplies the change binding for
    /// each field name.
    pub fn resolve<H>(
        config: &FormConfiguration,
        layout: LayoutPlan,
        values: &FormValues,
        errors: &BTreeMap<String, FieldError>,
        handler: H,
    ) -> Self
    where
        H: Fn(&str) -> ChangeHandler,
    {
        let fields = config
            .visible_fields()
            .filter_map(|field| {
                let error = errors.get(&field.name).map(|error| error.message.clone());
                let slot = resolve_slot(field, values.get(&field.name), error, handler(&field.name))?;
                Some(PlannedField {
                    name: field.name.clone(),
                    family: field.family(),
                    width: layout.width(),
                    slot,
                })
            })
            .collect();
        Self { layout, fields }
    }

    /// Returns the layout the plan was resolved with.
    pub fn layout(&self) -> LayoutPlan {
        self.layout
    }

    /// Returns the planned fields in configuration order.
    pub fn fields(&self) -> &[PlannedField] {
        &self.fields
    }

    /// Returns the planned field with the given name.
    pub fn get(&self, name: &str) -> Option<&PlannedField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Renders every planned field.
    pub fn render(&self, renderers: &Renderers) -> Vec<RenderedField> {
        self.fields
            .iter()
            .map(|field| RenderedField {
                name: field.name.clone(),
                width: field.width,
                markup: field.render(renderers),
            })
            .collect()
    }
}

fn resolve_slot(
    field: &FieldDescriptor,
    value: &FieldValue,
    error: Option<String>,
    on_change: ChangeHandler,
) -> Option<FieldSlot> {
    let slot = match field.family() {
        FieldFamily::Hidden => return None,
        FieldFamily::Text => FieldSlot::Text(TextProps {
            name: field.name.clone(),
            input_type: field.kind,
            placeholder: field.placeholder.clone(),
            value: value.as_text().unwrap_or_default().to_string(),
            error: error.is_some(),
            helper_text: error,
            full_width: true,
            on_change,
        }),
        FieldFamily::Select => {
            let current = value.as_text().unwrap_or_default();
            FieldSlot::Select(SelectProps {
                name: field.name.clone(),
                label: field.label.clone().or_else(|| field.placeholder.clone()),
                options: field.options().to_vec(),
                error: error.is_some(),
                controller: SelectController::new(current, error.clone(), on_change),
                helper_text: error,
            })
        }
        FieldFamily::File => {
            let file = value.as_file();
            let preview = if field.is_image() {
                file.map(|file| file.preview_uri())
            } else {
                None
            };
            FieldSlot::File(FileProps {
                name: field.name.clone(),
                label: field.label.clone(),
                error: error.is_some(),
                helper_text: error,
                accept: field.is_image().then(|| IMAGE_MIME_TYPES.join(",")),
                file_name: file.map(|file| file.name().to_string()),
                preview,
                on_change,
            })
        }
    };
    Some(slot)
}

// =============================================================================
// Rendered output
// =============================================================================

/// Markup for one field, with its layout width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedField {
    /// Field name.
    pub name: String,
    /// Width from the layout plan.
    pub width: FieldWidth,
    /// Output of the field's renderer.
    pub markup: Markup,
}

/// The human-verification surface shown instead of the inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeSurface {
    /// Site key handed to the challenge provider.
    pub site_key: String,
}

/// Everything a host needs to display a form in its current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedForm {
    /// Visible fields; empty while the challenge is shown.
    pub fields: Vec<RenderedField>,
    /// The challenge surface, while verification is pending.
    pub challenge: Option<ChallengeSurface>,
    /// Submit control; absent while the challenge is shown.
    pub button: Option<Markup>,
    /// Message of the last failed transmission.
    pub error: Option<String>,
}

impl RenderedForm {
    pub(crate) fn new(
        fields: Vec<RenderedField>,
        challenge: Option<ChallengeSurface>,
        button: Option<(&Renderers, ButtonProps)>,
        error: Option<String>,
    ) -> Self {
        Self {
            fields,
            challenge,
            button: button.map(|(renderers, props)| renderers.button().render_button(&props)),
            error,
        }
    }

    /// Returns the names of the rendered fields in order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }

    /// Assembles the complete form as HTML.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<form>");
        html.push_str("<div style=\"display: flex; flex-wrap: wrap; gap: 10px\">");
        for field in &self.fields {
            html.push_str(&format!(
                "<div style=\"margin-bottom: 16px; width: {}; box-sizing: border-box\">{}</div>",
                field.width.css(),
                field.markup
            ));
        }
        html.push_str("</div>");
        if let Some(challenge) = &self.challenge {
            html.push_str(&format!(
                "<div class=\"challenge\" data-sitekey=\"{}\"></div>",
                escape(&challenge.site_key)
            ));
        }
        if let Some(button) = &self.button {
            html.push_str(button.as_str());
        }
        if let Some(error) = &self.error {
            html.push_str(&format!("<p style=\"color: red\">{}</p>", escape(error)));
        }
        html.push_str("</form>");
        html
    }
}
