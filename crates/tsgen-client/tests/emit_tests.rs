use tsgen_client::TypeScriptGenerator;
use tsgen_core::codegen;
use tsgen_core::config::TsgenConfig;
use tsgen_core::document::{self, Dereferencer};
use tsgen_core::{CodeGenerator, GeneratedFile};

const WIDGETS: &str = include_str!("fixtures/widgets.yaml");

fn generate() -> Vec<GeneratedFile> {
    let raw = document::from_yaml(WIDGETS).unwrap();
    let doc = Dereferencer::dereference(&raw).unwrap();
    let unit = codegen::run(&doc, &TsgenConfig::default()).unwrap();
    TypeScriptGenerator.generate(&unit).unwrap()
}

fn file<'a>(files: &'a [GeneratedFile], path: &str) -> &'a GeneratedFile {
    files
        .iter()
        .find(|f| f.path == path)
        .unwrap_or_else(|| panic!("should emit {path}"))
}

#[test]
fn emits_one_file_per_module_plus_index() {
    let files = generate();
    let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    assert!(paths.contains(&"definitions.ts"));
    assert!(paths.contains(&"widgetsApi.ts"));
    assert!(paths.contains(&"gadgetsApi.ts"));
    assert!(paths.contains(&"index.ts"));
}

#[test]
fn definitions_module_renders_typedefs() {
    let files = generate();
    let defs = file(&files, "definitions.ts");

    assert!(defs.content.contains("export interface Widget {"));
    assert!(defs.content.contains("  id?: number;"));
    assert!(defs.content.contains("/** Human-readable widget name */"));
    assert!(defs
        .content
        .contains("export type WidgetStatus = \"active\" | \"retired\";"));
    assert!(defs.content.contains("export type WidgetList = Widget[];"));
    assert!(defs
        .content
        .contains("export type AuditedWidget = Base & AuditedWidgetUnionMember1;"));
    // The definitions module defines everything locally, imports nothing.
    assert!(!defs.content.contains("import {"));
}

#[test]
fn api_module_renders_class_and_imports() {
    let files = generate();
    let widgets = file(&files, "widgetsApi.ts");

    assert!(widgets
        .content
        .contains("import { ApiClient } from \"tsgen-runtime\";"));
    assert!(widgets.content.contains("from \"./definitions\";"));
    assert!(widgets
        .content
        .contains("export class WidgetsApi extends ApiClient {"));
    assert!(widgets
        .content
        .contains("async getWidget(id: number): Promise<Widget> {"));
    assert!(widgets.content.contains("path: `/widgets/${id}`"));
    // The request body typedef lives in the API module itself.
    assert!(widgets
        .content
        .contains("export interface CreateWidgetRequest {"));
}

#[test]
fn unwrap_translations_are_passed_to_the_runtime() {
    let files = generate();
    let widgets = file(&files, "widgetsApi.ts");
    assert!(widgets.content.contains(
        "[{ status: \"200\", contentType: \"application/json\", property: \"data\" }]"
    ));
}

#[test]
fn void_operations_do_not_return() {
    let files = generate();
    let misc = file(&files, "defaultApi.ts");
    assert!(misc.content.contains("async miscGet(): Promise<void> {"));
}

#[test]
fn index_reexports_with_relative_specifiers() {
    let files = generate();
    let index = file(&files, "index.ts");

    assert!(index.content.contains("from \"./definitions\";"));
    assert!(index.content.contains("from \"./widgetsApi\";"));
    let defs_line = index
        .content
        .lines()
        .find(|l| l.contains("./definitions"))
        .unwrap();
    assert!(defs_line.contains("Widget"));
    assert!(defs_line.contains("WidgetStatus"));
    // Nothing exports the runtime client.
    assert!(!index.content.contains("tsgen-runtime"));
}
