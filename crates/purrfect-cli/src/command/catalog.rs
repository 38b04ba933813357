use std::{fmt::Write as _, path::PathBuf};

use purrfect_engine::{BOMB_DEFINITION, CatalogIndex, PieceDefinition};

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct CatalogArg {
    /// Print the catalog as JSON instead of text
    #[arg(long)]
    json: bool,
    /// Output file path (JSON only)
    #[arg(long, requires = "json")]
    output: Option<PathBuf>,
}

fn describe(label: &str, definition: &PieceDefinition) -> String {
    // category Display ignores width
    let category = definition.category.to_string();
    let mut out = format!(
        "{label:>4}  {category:<6} {:>3}°  {}",
        definition.rotation.degrees(),
        definition.color,
    );
    if definition.size > 0 {
        write!(out, "  size {}", definition.size).unwrap();
    }
    out.push('\n');
    for row in definition.shape.to_ascii() {
        out.push_str("      ");
        out.push_str(&row);
        out.push('\n');
    }
    out
}

pub(crate) fn run(arg: &CatalogArg) -> anyhow::Result<()> {
    let CatalogArg { json, output } = arg;

    if *json {
        let definitions = CatalogIndex::all()
            .map(CatalogIndex::definition)
            .chain([&BOMB_DEFINITION])
            .collect::<Vec<_>>();
        return util::write_json(&definitions, output.as_deref());
    }

    for index in CatalogIndex::all() {
        println!("{}", describe(&index.get().to_string(), index.definition()));
    }
    println!("{}", describe("bomb", &BOMB_DEFINITION));
    Ok(())
}
