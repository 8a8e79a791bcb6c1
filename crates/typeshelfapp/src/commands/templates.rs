use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, ShelfError};
use crate::model::{TemplateDraft, TemplateRecord};
use crate::registry::TemplateManager;
use crate::store::mirror::Mirror;
use crate::store::Table;
use crate::validation::validate_template_name;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTemplateRequest {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl SaveTemplateRequest {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_template_name(&self.name)?;
        if self.content.trim().is_empty() {
            return Err(ShelfError::Validation("template content is required".into()));
        }
        Ok(())
    }

    pub fn into_draft(self) -> TemplateDraft {
        TemplateDraft {
            name: self.name,
            content: self.content,
            description: self.description,
            category: self.category,
        }
    }
}

/// Replacement body for an existing template. Every mutable field is
/// replaced, so an omitted description or category is cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplateRequest {
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl UpdateTemplateRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(ShelfError::Validation("template content is required".into()));
        }
        Ok(())
    }

    fn into_request(self, name: &str) -> SaveTemplateRequest {
        SaveTemplateRequest {
            name: name.to_string(),
            content: self.content,
            description: self.description,
            category: self.category,
        }
    }
}

fn not_found(name: &str) -> ShelfError {
    ShelfError::NotFound(format!("template '{}'", name))
}

fn saved(template: TemplateRecord, verb: &str) -> CmdResult {
    let message = CmdMessage::success(format!("{} template '{}'.", verb, template.name));
    CmdResult::default()
        .with_templates(vec![template])
        .with_message(message)
}

pub fn list<T: Table<TemplateRecord>, M: Mirror>(
    templates: &TemplateManager<T, M>,
    category: Option<&str>,
) -> CmdResult {
    let listed = match category {
        Some(category) => templates.list_by_category(category),
        None => templates.list_all(),
    };
    let mut result = CmdResult::default();
    if listed.is_empty() {
        result.add_message(CmdMessage::info("No templates found."));
    }
    result.with_templates(listed)
}

pub fn show<T: Table<TemplateRecord>, M: Mirror>(
    templates: &TemplateManager<T, M>,
    name: &str,
) -> Result<CmdResult> {
    let template = templates.get(name)?.ok_or_else(|| not_found(name))?;
    let mut result = CmdResult::default();
    if let Some(path) = templates.mirror_path(name) {
        result = result.with_paths(vec![path]);
    }
    Ok(result.with_templates(vec![template]))
}

/// Creates a template. Fails with `Conflict` when the name is taken.
pub fn create<T: Table<TemplateRecord>, M: Mirror>(
    templates: &TemplateManager<T, M>,
    request: SaveTemplateRequest,
) -> Result<CmdResult> {
    request.validate()?;
    let stored = templates.create(request.into_draft())?;
    Ok(saved(stored, "Created"))
}

/// Replaces an existing template. Fails with `NotFound` when absent.
pub fn update<T: Table<TemplateRecord>, M: Mirror>(
    templates: &TemplateManager<T, M>,
    name: &str,
    request: UpdateTemplateRequest,
) -> Result<CmdResult> {
    let request = request.into_request(name);
    request.validate()?;
    let stored = templates.replace(request.into_draft())?;
    Ok(saved(stored, "Updated"))
}

/// Creates or replaces a template.
pub fn save<T: Table<TemplateRecord>, M: Mirror>(
    templates: &TemplateManager<T, M>,
    request: SaveTemplateRequest,
) -> Result<CmdResult> {
    request.validate()?;
    let existed = templates.exists(&request.name)?;
    let stored = templates.save(request.into_draft())?;
    Ok(saved(stored, if existed { "Updated" } else { "Created" }))
}

pub fn delete<T: Table<TemplateRecord>, M: Mirror>(
    templates: &TemplateManager<T, M>,
    name: &str,
) -> Result<CmdResult> {
    if !templates.delete(name)? {
        return Err(not_found(name));
    }
    Ok(CmdResult::default().with_message(CmdMessage::success(format!(
        "Deleted template '{}'.",
        name
    ))))
}

pub fn categories<T: Table<TemplateRecord>, M: Mirror>(
    templates: &TemplateManager<T, M>,
) -> CmdResult {
    let categories = templates.categories();
    let mut result = CmdResult::default();
    if categories.is_empty() {
        result.add_message(CmdMessage::info("No categories in use."));
    }
    result.with_categories(categories)
}

pub fn statistics<T: Table<TemplateRecord>, M: Mirror>(
    templates: &TemplateManager<T, M>,
) -> CmdResult {
    CmdResult {
        statistics: Some(templates.statistics()),
        ..Default::default()
    }
}

pub fn reload<T: Table<TemplateRecord>, M: Mirror>(
    templates: &TemplateManager<T, M>,
) -> Result<CmdResult> {
    let count = templates.reload()?;
    Ok(CmdResult::default().with_message(CmdMessage::success(format!(
        "Reloaded {} template(s).",
        count
    ))))
}

pub fn clear<T: Table<TemplateRecord>, M: Mirror>(
    templates: &TemplateManager<T, M>,
) -> Result<CmdResult> {
    let removed = templates.clear_all()?;
    Ok(CmdResult::default().with_message(CmdMessage::success(format!(
        "Cleared {} template(s).",
        removed
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::memory::{MemMirror, MemTable};
    use std::sync::{Arc, Barrier};
    use std::thread;

    const BODY: &str = "<jasperReport name=\"r\"></jasperReport>";

    fn manager() -> TemplateManager<MemTable<TemplateRecord>, MemMirror> {
        let manager = TemplateManager::new(MemTable::new(), MemMirror::new());
        manager.init().unwrap();
        manager
    }

    #[test]
    fn create_conflicts_on_existing_name() {
        let templates = manager();
        create(&templates, SaveTemplateRequest::new("invoice", BODY)).unwrap();

        let err = create(&templates, SaveTemplateRequest::new("invoice", BODY)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn racing_creates_yield_one_conflict() {
        let templates = Arc::new(manager());
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let templates = Arc::clone(&templates);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    create(&templates, SaveTemplateRequest::new("dup", BODY))
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let created = results.iter().filter(|r| r.is_ok()).count();
        let kinds: Vec<_> = results
            .iter()
            .filter_map(|r| r.as_ref().err().map(|e| e.kind()))
            .collect();
        assert_eq!(created, 1);
        assert_eq!(kinds, vec![ErrorKind::Conflict]);
    }

    #[test]
    fn update_requires_existing_name() {
        let templates = manager();
        let err = update(&templates, "ghost", UpdateTemplateRequest::new(BODY)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(templates.count(), 0);
    }

    #[test]
    fn update_replaces_all_mutable_fields() {
        let templates = manager();
        let mut request = SaveTemplateRequest::new("invoice", BODY);
        request.description = Some("Monthly".into());
        request.category = Some("billing".into());
        create(&templates, request).unwrap();

        let result = update(&templates, "invoice", UpdateTemplateRequest::new(BODY)).unwrap();

        let template = &result.templates[0];
        assert_eq!(template.description, None);
        assert_eq!(template.category, None);
        assert!(result.messages[0].content.starts_with("Updated"));
    }

    #[test]
    fn save_is_an_upsert() {
        let templates = manager();
        let first = save(&templates, SaveTemplateRequest::new("r", BODY)).unwrap();
        let second = save(&templates, SaveTemplateRequest::new("r", BODY)).unwrap();
        assert!(first.messages[0].content.starts_with("Created"));
        assert!(second.messages[0].content.starts_with("Updated"));
        assert_eq!(templates.count(), 1);
    }

    #[test]
    fn blank_content_is_rejected_at_the_boundary() {
        let templates = manager();
        let err = save(&templates, SaveTemplateRequest::new("r", "  ")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn delete_unknown_is_not_found() {
        let templates = manager();
        assert_eq!(
            delete(&templates, "nope").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn show_includes_mirror_path() {
        let templates = manager();
        save(&templates, SaveTemplateRequest::new("r", BODY)).unwrap();
        let result = show(&templates, "r").unwrap();
        assert_eq!(result.templates.len(), 1);
        assert_eq!(result.paths.len(), 1);
    }

    #[test]
    fn list_filters_by_category() {
        let templates = manager();
        let mut request = SaveTemplateRequest::new("a", BODY);
        request.category = Some("sales".into());
        save(&templates, request).unwrap();
        save(&templates, SaveTemplateRequest::new("b", BODY)).unwrap();

        assert_eq!(list(&templates, Some("sales")).templates.len(), 1);
        assert_eq!(list(&templates, None).templates.len(), 2);
        let empty = list(&templates, Some("none"));
        assert_eq!(empty.messages[0].content, "No templates found.");
    }

    #[test]
    fn statistics_and_categories() {
        let templates = manager();
        let mut request = SaveTemplateRequest::new("a", BODY);
        request.category = Some("sales".into());
        save(&templates, request).unwrap();

        assert_eq!(categories(&templates).categories, vec!["sales"]);
        let stats = statistics(&templates).statistics.unwrap();
        assert_eq!(stats.total_templates, 1);
        assert_eq!(stats.categories, 1);
    }
}
