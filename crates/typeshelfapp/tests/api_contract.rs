mod common;

use common::TEMPLATE;
use std::fs;
use tempfile::TempDir;
use typeshelfapp::api::ShelfApi;
use typeshelfapp::commands::fonts::RegisterFontRequest;
use typeshelfapp::commands::templates::{SaveTemplateRequest, UpdateTemplateRequest};
use typeshelfapp::error::ErrorKind;
use typeshelfapp::init::{MemoryBackend, Shelf};
use typeshelfapp::notifier::NotifierCall;
use typeshelfapp::store::mirror::Mirror;
use typeshelfapp::store::Table;

fn api(dir: &TempDir) -> ShelfApi<MemoryBackend> {
    let api = ShelfApi::new(Shelf::in_memory(dir.path().join("uploads")));
    api.startup().unwrap();
    api
}

#[test]
fn font_persistence_failure_aborts_the_whole_mutation() {
    let dir = TempDir::new().unwrap();
    let api = api(&dir);
    let file = dir.path().join("acme.ttf");
    fs::write(&file, b"ttf").unwrap();
    api.shelf().fonts().table().set_simulate_write_error(true);

    let err = api
        .register_font(RegisterFontRequest::new("Acme", file.to_string_lossy()))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert_eq!(api.get_font("Acme").unwrap_err().kind(), ErrorKind::NotFound);
    assert!(api.shelf().fonts().notifier().calls().is_empty());
}

#[test]
fn template_persistence_failure_aborts_the_whole_mutation() {
    let dir = TempDir::new().unwrap();
    let api = api(&dir);
    api.shelf().templates().table().set_simulate_write_error(true);

    let err = api
        .save_template(SaveTemplateRequest::new("invoice", TEMPLATE))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert!(!api.shelf().templates().mirror().contains("invoice"));
    assert_eq!(api.shelf().templates().count(), 0);
}

#[test]
fn notifier_sees_every_settled_font_set() {
    let dir = TempDir::new().unwrap();
    let api = api(&dir);
    for name in ["b", "a"] {
        let file = dir.path().join(format!("{name}.ttf"));
        fs::write(&file, b"ttf").unwrap();
        api.register_font(RegisterFontRequest::new(name, file.to_string_lossy()))
            .unwrap();
    }
    api.clear_fonts(false).unwrap();

    assert_eq!(
        api.shelf().fonts().notifier().calls(),
        vec![
            NotifierCall::Regenerate(vec!["b".into()]),
            NotifierCall::Regenerate(vec!["a".into(), "b".into()]),
            NotifierCall::RemoveAll,
        ]
    );
}

#[test]
fn create_update_delete_lifecycle() {
    let dir = TempDir::new().unwrap();
    let api = api(&dir);

    api.create_template(SaveTemplateRequest::new("invoice", TEMPLATE))
        .unwrap();
    assert_eq!(
        api.create_template(SaveTemplateRequest::new("invoice", TEMPLATE))
            .unwrap_err()
            .kind(),
        ErrorKind::Conflict
    );
    assert_eq!(
        api.update_template("other", UpdateTemplateRequest::new(TEMPLATE))
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );

    let mut update = UpdateTemplateRequest::new(TEMPLATE);
    update.category = Some("billing".into());
    api.update_template("invoice", update).unwrap();
    assert_eq!(api.template_categories().unwrap().categories, vec!["billing"]);

    api.delete_template("invoice").unwrap();
    assert_eq!(
        api.delete_template("invoice").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn requests_reject_blank_input_before_the_core() {
    let dir = TempDir::new().unwrap();
    let api = api(&dir);

    assert_eq!(
        api.register_font(RegisterFontRequest::new(" ", "/a.ttf"))
            .unwrap_err()
            .kind(),
        ErrorKind::Validation
    );
    assert_eq!(
        api.save_template(SaveTemplateRequest::new("a/b", TEMPLATE))
            .unwrap_err()
            .kind(),
        ErrorKind::Validation
    );
    assert!(api.shelf().fonts().table().list_all().unwrap().is_empty());
}
