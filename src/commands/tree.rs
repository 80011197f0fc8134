use super::Context;
use super::args::{TreeArgs, TreeFormat};
use crate::shared::error::Result;
use crate::shared::store::ProjectStore;
use crate::shared::tasks::{TaskNode, forest_to_json};

pub(super) fn render(forest: &[TaskNode], format: TreeFormat) -> Result<String> {
    match format {
        TreeFormat::Json => forest_to_json(forest),
        TreeFormat::Yaml => Ok(serde_yaml::to_string(forest)?),
    }
}

pub fn execute<S: ProjectStore>(args: TreeArgs, ctx: &Context<'_, S>) -> Result<()> {
    let forest = ctx.store.load(&args.project)?;
    println!("{}", render(&forest, args.format)?);
    Ok(())
}
