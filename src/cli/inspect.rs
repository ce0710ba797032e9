//! Show how a metadata identifier is parsed.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use crate::metadata::MetadataId;

/// Command to parse and display a metadata identifier.
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Identifier such as MID:JavaBean#SRC_MAIN_JAVA?com.example.Customer
    id: String,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

impl InspectCommand {
    /// Parse the identifier and print its components.
    ///
    /// # Errors
    ///
    /// Returns the parse error for a malformed identifier.
    pub fn execute(self) -> Result<()> {
        let id = MetadataId::parse(&self.id)
            .with_context(|| format!("Cannot inspect '{}'", self.id))?;
        println!("{}", self.describe(&id)?);
        Ok(())
    }

    fn describe(&self, id: &MetadataId) -> Result<String> {
        let target = id.target_type().map(ToString::to_string);
        let path = id.path().map(ToString::to_string);

        if self.json {
            let value = json!({
                "id": id.to_string(),
                "tag": id.provider_tag().as_str(),
                "class_level": id.is_class_level(),
                "class_id": id.class_id().to_string(),
                "target": target,
                "path": path,
            });
            return Ok(serde_json::to_string_pretty(&value)?);
        }

        let mut lines = vec![
            format!("id:          {id}"),
            format!("tag:         {}", id.provider_tag()),
            format!("class-level: {}", id.is_class_level()),
        ];
        if let (Some(target), Some(path)) = (target, path) {
            lines.push(format!("target:      {target}"));
            lines.push(format!("path:        {path}"));
            lines.push(format!("class id:    {}", id.class_id()));
        }
        Ok(lines.join("\n"))
    }
}
