use crate::wizard::job_form::{FormField, JobObjectForm, Notice};
use crate::wizard::navigation::{clamp_selection, FormRowKind, NavState, FORM_ROWS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRow {
    pub kind: FormRowKind,
    pub label: &'static str,
    pub value: String,
    pub required: bool,
    pub invalid: bool,
}

pub struct FormViewModel {
    pub title: String,
    pub rows: Vec<FormRow>,
    pub selected: usize,
    pub status_text: String,
    pub hint_text: String,
}

pub fn row_field(kind: FormRowKind) -> FormField {
    match kind {
        FormRowKind::Name => FormField::Name,
        FormRowKind::Description => FormField::Description,
        FormRowKind::Toolbox => FormField::Toolbox,
        FormRowKind::Resources => FormField::Resources,
        FormRowKind::EmailNotification => FormField::EmailNotification,
    }
}

fn row_label(kind: FormRowKind) -> &'static str {
    match kind {
        FormRowKind::Name => "Job Name",
        FormRowKind::Description => "Job Description",
        FormRowKind::Toolbox => "Toolbox",
        FormRowKind::Resources => "Resources",
        FormRowKind::EmailNotification => "Email Notification",
    }
}

fn row_value(form: &JobObjectForm, kind: FormRowKind) -> String {
    match kind {
        FormRowKind::Name => form.name().to_string(),
        FormRowKind::Description => form.description().to_string(),
        FormRowKind::Toolbox => form
            .toolbox_display()
            .unwrap_or("<select a toolbox>")
            .to_string(),
        FormRowKind::Resources => form
            .compute_type_display()
            .unwrap_or("<select a resource configuration>")
            .to_string(),
        FormRowKind::EmailNotification => if form.email_notification() {
            "on"
        } else {
            "off"
        }
        .to_string(),
    }
}

pub fn project_form_view_model(form: &JobObjectForm, nav: &NavState) -> FormViewModel {
    let rows = FORM_ROWS
        .iter()
        .map(|kind| FormRow {
            kind: *kind,
            label: row_label(*kind),
            value: row_value(form, *kind),
            required: matches!(kind, FormRowKind::Toolbox | FormRowKind::Resources),
            invalid: form.invalid_fields().contains(&row_field(*kind)),
        })
        .collect::<Vec<_>>();
    FormViewModel {
        title: form.title().to_string(),
        selected: clamp_selection(nav.selected, rows.len()),
        rows,
        status_text: nav.status_text.clone(),
        hint_text: nav.hint_text.clone(),
    }
}

pub fn toolbox_picker_items(form: &JobObjectForm) -> Vec<String> {
    form.images()
        .iter()
        .map(|image| match &image.description {
            Some(description) => format!("{} - {}", image.name, description),
            None => image.name.clone(),
        })
        .collect()
}

pub fn resource_picker_items(form: &JobObjectForm) -> Vec<String> {
    form.compute_types()
        .iter()
        .map(|compute_type| compute_type.long_description.clone())
        .collect()
}

pub fn notice_lines(notice: &Notice) -> Vec<String> {
    let mut lines = vec![notice.message.clone()];
    if let Some(detail) = &notice.detail {
        lines.extend(detail.lines().map(str::to_string));
    }
    lines
}

pub fn tail_for_display(value: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max_chars {
        return value.to_string();
    }
    chars[chars.len() - max_chars..].iter().collect()
}
