use minijinja::{context, Environment};

use tsgen_core::ir::{ModuleUnit, OperationDescriptor, ParamLocation, Typedef};

use super::{binding_clause, escape_jsdoc, parenthesize, property_key};

/// Emit one generated module: imports, typedefs, and (for API groups) the
/// operation class.
pub fn emit_module(module: &ModuleUnit) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.add_filter("escape_jsdoc", escape_jsdoc);
    env.add_template("module.ts.j2", include_str!("../../templates/module.ts.j2"))?;
    let tmpl = env.get_template("module.ts.j2")?;

    let imports: Vec<minijinja::Value> = module
        .imports
        .iter()
        .map(|group| {
            let clause = group
                .bindings
                .iter()
                .map(|b| binding_clause(&b.exported, &b.local))
                .collect::<Vec<_>>()
                .join(", ");
            context! {
                specifier => group.specifier.clone(),
                clause => clause,
            }
        })
        .collect();

    let typedefs: Vec<minijinja::Value> = module.typedefs.iter().map(typedef_to_ctx).collect();
    let operations: Vec<minijinja::Value> =
        module.operations.iter().map(operation_to_ctx).collect();

    tmpl.render(context! {
        imports => imports,
        typedefs => typedefs,
        class_name => module.class_name.clone(),
        base_class => module.base_class.clone(),
        operations => operations,
    })
}

fn typedef_to_ctx(typedef: &Typedef) -> minijinja::Value {
    match typedef {
        Typedef::Object(obj) => {
            let fields: Vec<minijinja::Value> = obj
                .fields
                .iter()
                .map(|f| {
                    context! {
                        key => property_key(&f.name),
                        type => f.type_expr.clone(),
                        description => f.description.clone(),
                    }
                })
                .collect();
            context! {
                kind => "object",
                name => obj.name.clone(),
                description => obj.description.clone(),
                fields => fields,
            }
        }
        Typedef::Array(arr) => context! {
            kind => "alias",
            name => arr.name.clone(),
            description => arr.description.clone(),
            expr => format!("{}[]", parenthesize(&arr.item_expr)),
        },
        Typedef::Enum(en) => context! {
            kind => "alias",
            name => en.name.clone(),
            description => en.description.clone(),
            expr => en.literals.join(" | "),
        },
        Typedef::Union(un) => context! {
            kind => "alias",
            name => un.name.clone(),
            description => un.description.clone(),
            expr => un
                .members
                .iter()
                .map(|m| parenthesize(m))
                .collect::<Vec<_>>()
                .join(" & "),
        },
    }
}

fn operation_to_ctx(op: &OperationDescriptor) -> minijinja::Value {
    context! {
        name => op.name.clone(),
        description => op.description.clone(),
        signature => signature(op),
        return_type => op.return_expr.clone(),
        is_void => op.return_expr == "void",
        options => request_options(op),
        translations => translations(op),
    }
}

/// Argument list, required before optional so the signature is valid
/// TypeScript regardless of declaration order.
fn signature(op: &OperationDescriptor) -> String {
    let mut parts = Vec::new();
    for param in op.params.iter().filter(|p| p.required) {
        parts.push(format!("{}: {}", param.arg_name, param.type_expr));
    }
    if let Some(body) = op.body.as_ref().filter(|b| b.required) {
        parts.push(format!("{}: {}", body.arg_name, body.type_expr));
    }
    for param in op.params.iter().filter(|p| !p.required) {
        parts.push(format!("{}?: {}", param.arg_name, param.type_expr));
    }
    if let Some(body) = op.body.as_ref().filter(|b| !b.required) {
        parts.push(format!("{}?: {}", body.arg_name, body.type_expr));
    }
    parts.join(", ")
}

/// The options object handed to the runtime client's `request`.
fn request_options(op: &OperationDescriptor) -> String {
    let mut parts = vec![
        format!("method: \"{}\"", op.method.as_str()),
        format!("path: `{}`", op.path_expr),
    ];

    let group = |location: ParamLocation| -> Vec<String> {
        op.params
            .iter()
            .filter(|p| p.location == location)
            .map(|p| format!("{}: {}", property_key(&p.name), p.arg_name))
            .collect()
    };

    let query = group(ParamLocation::Query);
    if !query.is_empty() {
        parts.push(format!("query: {{ {} }}", query.join(", ")));
    }
    let headers = group(ParamLocation::Header);
    if !headers.is_empty() {
        parts.push(format!("headers: {{ {} }}", headers.join(", ")));
    }
    if let Some(body) = &op.body {
        parts.push(format!("body: {}", body.arg_name));
    }

    format!("{{ {} }}", parts.join(", "))
}

/// Response-translation table, or `None` when nothing is unwrapped.
fn translations(op: &OperationDescriptor) -> Option<String> {
    if op.translations.is_empty() {
        return None;
    }
    let entries: Vec<String> = op
        .translations
        .iter()
        .map(|t| {
            format!(
                "{{ status: {}, contentType: {}, property: {} }}",
                quoted(&t.status),
                quoted(&t.content_type),
                quoted(&t.property),
            )
        })
        .collect();
    Some(format!("[{}]", entries.join(", ")))
}

fn quoted(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsgen_core::ir::{
        BodyDescriptor, HttpMethod, ParamDescriptor, ResponseTranslation,
    };

    fn operation() -> OperationDescriptor {
        OperationDescriptor {
            name: "createWidget".to_string(),
            method: HttpMethod::Post,
            path: "/widgets/{id}".to_string(),
            path_expr: "/widgets/${id}".to_string(),
            params: vec![
                ParamDescriptor {
                    name: "id".to_string(),
                    arg_name: "id".to_string(),
                    location: ParamLocation::Path,
                    type_expr: "number".to_string(),
                    required: true,
                    description: None,
                },
                ParamDescriptor {
                    name: "dry-run".to_string(),
                    arg_name: "dryRun".to_string(),
                    location: ParamLocation::Query,
                    type_expr: "boolean".to_string(),
                    required: false,
                    description: None,
                },
            ],
            body: Some(BodyDescriptor {
                arg_name: "body".to_string(),
                type_expr: "CreateWidgetRequest".to_string(),
                required: true,
                content_type: "application/json".to_string(),
            }),
            return_expr: "Widget".to_string(),
            translations: vec![ResponseTranslation {
                status: "200".to_string(),
                content_type: "application/json".to_string(),
                property: "widget".to_string(),
            }],
            description: None,
        }
    }

    #[test]
    fn signature_orders_required_before_optional() {
        assert_eq!(
            signature(&operation()),
            "id: number, body: CreateWidgetRequest, dryRun?: boolean"
        );
    }

    #[test]
    fn request_options_group_by_location() {
        assert_eq!(
            request_options(&operation()),
            "{ method: \"POST\", path: `/widgets/${id}`, query: { \"dry-run\": dryRun }, body: body }"
        );
    }

    #[test]
    fn translations_render_as_a_table() {
        assert_eq!(
            translations(&operation()).unwrap(),
            "[{ status: \"200\", contentType: \"application/json\", property: \"widget\" }]"
        );
    }
}
