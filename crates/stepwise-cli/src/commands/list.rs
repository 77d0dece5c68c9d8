//! List command - describe every demo routine

use crate::demos::DemoKind;
use anyhow::Result;
use serde::Serialize;
use stepwise_runtime::Descriptor;

#[derive(Debug, Serialize)]
struct Entry {
    demo: DemoKind,
    #[serde(flatten)]
    routine: Descriptor,
}

fn entries() -> Vec<Entry> {
    DemoKind::ALL
        .into_iter()
        .flat_map(|demo| {
            demo.descriptors()
                .into_iter()
                .map(move |routine| Entry { demo, routine })
        })
        .collect()
}

/// Render the listing as aligned text lines.
pub fn render() -> Vec<String> {
    entries()
        .iter()
        .map(|entry| format!("{:<10} {}", entry.demo.as_str(), entry.routine))
        .collect()
}

pub fn run(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&entries())?);
    } else {
        for line in render() {
            println!("{}", line);
        }
    }
    Ok(())
}
