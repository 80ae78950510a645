//! Project creation and scaffolding

use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::config::EmberConfig;

/// Create a new Ember scene project
pub fn create_project(path: &Path, name: &str) -> Result<()> {
    for dir in [
        "assets/images",
        "assets/geometry/lineart",
        "assets/geometry/pointcloud",
        "scenes/configs",
        "novels",
    ] {
        fs::create_dir_all(path.join(dir))?;
    }

    let mut config = EmberConfig::new(name);
    config.project.novel = Some(name.to_string());
    fs::write(path.join("ember.toml"), config.to_toml()?)?;

    let scene = json!({
        "id": "intro",
        "duration": 10,
        "image": {
            "path": "intro.png",
            "padding": 0.1,
            "animation": {
                "type": "panzoom",
                "config": {
                    "keyframes": [
                        { "view": { "x": 0, "y": 0, "scale": 1, "duration": 1 } },
                        { "view": { "x": 0.1, "y": 0, "scale": 1.5, "duration": 3 } }
                    ]
                }
            }
        },
        "text": {
            "verses": [{ "id": 1, "lines": ["Once, the harbor was quiet."] }],
            "animation": { "type": "slidestack", "config": {} }
        }
    });
    fs::write(
        path.join("scenes/configs/intro.json"),
        serde_json::to_string_pretty(&scene)?,
    )?;

    let novel = json!({ "id": name, "title": name, "scenes": ["intro"] });
    fs::write(
        path.join("novels").join(format!("{}.json", name)),
        serde_json::to_string_pretty(&novel)?,
    )?;

    fs::write(
        path.join("README.md"),
        format!(
            r#"# {}

An Ember scene project. Put `intro.png` under `assets/images/`, then:

```bash
ember play intro --script "v wait:3 t wait:1 v wait:4"
ember novel {}
```

## Project Structure

```
{}/
├── ember.toml                 # Player configuration
├── assets/
│   ├── images/                # Base images
│   └── geometry/              # lineart/ and pointcloud/ data
├── scenes/configs/            # One JSON file per scene
└── novels/                    # Scene sequences
```
"#,
            name, name, name
        ),
    )?;

    Ok(())
}
