//! Output formatting for parse results.

use crate::cli::OutputFormat;
use crate::error::FileError;
use crate::orchestrator::RunResult;
use miette::{IntoDiagnostic, Result};
use tempeh_parser::{Element, Node, TemplateData};

/// Formatter for parse output.
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print the data parsed from one file.
    pub fn print_parsed(&self, file: &str, data: &TemplateData) -> Result<()> {
        match self.format {
            OutputFormat::Human => println!("{}", human_line(file, data)),
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "type": "template",
                    "file": file,
                    "data": data,
                });
                println!("{}", json);
            }
            OutputFormat::Pretty => println!("{}", render_json(data)?),
        }
        Ok(())
    }

    /// Print a file that was written to disk instead of stdout.
    pub fn print_written(&self, file: &str, target: &str) {
        match self.format {
            OutputFormat::Human | OutputFormat::Pretty => {
                println!("\x1b[32m✓\x1b[0m {} -> {}", file, target);
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "type": "written",
                    "file": file,
                    "output": target,
                });
                println!("{}", json);
            }
        }
    }

    /// Print a failure. Human output goes through miette.
    pub fn print_error(&self, file: &str, error: FileError) {
        match self.format {
            OutputFormat::Human | OutputFormat::Pretty => {
                eprintln!("{:?}", miette::Report::new(error));
            }
            OutputFormat::Json => {
                let position = error.position();
                let json = serde_json::json!({
                    "type": "error",
                    "file": file,
                    "code": error.code(),
                    "message": error.to_string(),
                    "line": position.map(|p| p.line),
                    "column": position.map(|p| p.column),
                });
                println!("{}", json);
            }
        }
    }

    /// Print the summary.
    pub fn print_summary(&self, result: &RunResult) {
        match self.format {
            OutputFormat::Human => print_summary_human(result),
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "type": "summary",
                    "files": result.file_count,
                    "errors": result.error_count,
                    "duration_ms": result.duration_ms,
                });
                println!("{}", json);
            }
            // Stdout carries the documents; keep it parseable.
            OutputFormat::Pretty => {}
        }
    }
}

/// Pretty JSON for one template.
pub fn render_json(data: &TemplateData) -> Result<String> {
    serde_json::to_string_pretty(data).into_diagnostic()
}

fn human_line(file: &str, data: &TemplateData) -> String {
    let nodes = count_nodes(&data.main_component.root_node)
        + data
            .inline_components
            .values()
            .map(|c| count_nodes(&c.root_node))
            .sum::<usize>();
    let assets: usize = data
        .assets
        .values()
        .map(|b| b.scripts.len() + b.styles.len())
        .sum();

    format!(
        "\x1b[32m✓\x1b[0m {}: {} node{}, {} inline component{}, {} asset{}, {} import{}",
        file,
        nodes,
        plural(nodes),
        data.inline_components.len(),
        plural(data.inline_components.len()),
        assets,
        plural(assets),
        data.component_imports.len(),
        plural(data.component_imports.len()),
    )
}

/// Nodes below `element`, not counting `element` itself.
fn count_nodes(element: &Element) -> usize {
    element
        .children
        .iter()
        .map(|child| match child {
            Node::Text(_) => 1,
            Node::Element(el) => 1 + count_nodes(el),
        })
        .sum()
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn print_summary_human(result: &RunResult) {
    println!();
    if result.error_count == 0 {
        println!(
            "\x1b[32m✓\x1b[0m Parsed {} file{} ({}ms)",
            result.file_count,
            plural(result.file_count),
            result.duration_ms
        );
    } else {
        println!(
            "\x1b[31m✗\x1b[0m Found {} error{} in {} file{}",
            result.error_count,
            plural(result.error_count),
            result.file_count,
            plural(result.file_count)
        );
        println!("Time: {}ms", result.duration_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempeh_parser::parse_template;

    #[test]
    fn test_json_shape() {
        let data = parse_template(r#"<p :title="props.t">Hi</p><style>a{}</style>"#).unwrap();
        insta::assert_json_snapshot!(data, @r###"
        {
          "mainComponent": {
            "rootNode": {
              "tagName": "",
              "children": [
                {
                  "tagName": "p",
                  "renderAttributes": [
                    {
                      "name": "attr",
                      "modifier": "title",
                      "expressionValue": "props.t",
                      "doesExpressionReferenceProps": true,
                      "position": "1:4"
                    }
                  ],
                  "children": [
                    {
                      "textContent": "Hi",
                      "position": "1:21"
                    }
                  ],
                  "position": "1:1"
                }
              ],
              "position": "1:1"
            }
          },
          "assets": {
            "default": {
              "styles": [
                {
                  "content": "a{}",
                  "position": "1:34"
                }
              ]
            }
          }
        }
        "###);
    }

    #[test]
    fn test_component_and_import_keys() {
        let source = concat!(
            r#"<link rel="import" href="./card.tmph.html" as="Card">"#,
            r#"<template #component="Item"><slot name="label"></slot><slot></slot>"#,
            r#"<script #types>/** @typedef {object} Props */</script></template>"#,
            r#"<script #bucket="vendor" #scope:page src="./a.js"></script>"#,
        );
        let mut data = parse_template(source).unwrap();
        data.source_file_path = Some("item.tmph.html".to_string());

        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["sourceFilePath"], "item.tmph.html");
        assert_eq!(value["componentImports"][0]["importName"], "Card");
        assert_eq!(value["componentImports"][0]["path"], "./card.tmph.html");

        let item = &value["inlineComponents"]["Item"];
        assert_eq!(item["hasDefaultSlot"], true);
        assert_eq!(item["namedSlots"], serde_json::json!(["label"]));
        assert_eq!(item["propTypesJSDoc"], "/** @typedef {object} Props */");
        assert_eq!(item["rootNode"]["tagName"], "template");

        let script = &value["assets"]["vendor"]["scripts"][0];
        assert_eq!(script["path"], "./a.js");
        assert_eq!(script["scope"], "page");
        assert!(script.get("content").is_none());

        let main = &value["mainComponent"];
        assert!(main.get("hasDefaultSlot").is_none());
        assert!(main.get("namedSlots").is_none());
    }

    #[test]
    fn test_json_reads_back() {
        let data = parse_template(
            r#"<ul #for="item in await items()"><li>x</li></ul><script>run()</script>"#,
        )
        .unwrap();
        let json = render_json(&data).unwrap();
        let back: TemplateData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_human_line() {
        let data = parse_template(
            r#"<div>a<b>c</b></div><template #component="X"><i></i></template><style>p{}</style>"#,
        )
        .unwrap();
        assert_eq!(
            human_line("index.tmph.html", &data),
            "\x1b[32m✓\x1b[0m index.tmph.html: 5 nodes, 1 inline component, 1 asset, 0 imports"
        );
    }
}
