use minijinja::{context, Environment};

use tsgen_core::ir::IndexUnit;

/// Emit the index module re-exporting every public symbol.
pub fn emit_index(index: &IndexUnit) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.add_template("index.ts.j2", include_str!("../../templates/index.ts.j2"))?;
    let tmpl = env.get_template("index.ts.j2")?;

    let exports: Vec<minijinja::Value> = index
        .exports
        .iter()
        .map(|group| {
            context! {
                specifier => group.specifier.clone(),
                clause => group.names.join(", "),
            }
        })
        .collect();

    tmpl.render(context! { exports => exports })
}
