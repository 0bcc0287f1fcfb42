//! Built-in demonstration library
//!
//! A small set of tools linked directly into the binary so the CLI is
//! usable before any `*.toollib` manifest is installed. They double as the
//! factory table for manifest resolution.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tellus_core::prelude::*;

pub const LIBRARY_ID: &str = "demo";

/// Generates a grid filled with one value.
struct ConstantGrid {
    info: ToolInfo,
}

impl ConstantGrid {
    fn new() -> Self {
        Self {
            info: ToolInfo::new("constant_grid", "Constant Grid")
                .with_description("Create a grid with every cell set to one value")
                .with_category("Grid|Generation"),
        }
    }
}

#[async_trait]
impl Tool for ConstantGrid {
    fn info(&self) -> &ToolInfo {
        &self.info
    }

    fn parameters(&self) -> ParameterList {
        ParameterList::new()
            .with(Parameter::double("value", "Cell value").with_default(json!(0.0)))
            .with(
                Parameter::int("cells", "Cells per side")
                    .with_bounds(1.0, 10_000.0)
                    .with_default(json!(100)),
            )
            .with(Parameter::output("grid", "Output grid", DataKind::Grid))
    }

    async fn run(
        &self,
        parameters: &mut ParameterList,
        ctx: &ExecutionContext,
    ) -> std::result::Result<(), ToolFailure> {
        let value = parameters
            .get("value")
            .and_then(|p| p.value.as_double())
            .ok_or_else(|| ToolFailure::error("value not bound"))?;
        let cells = parameters
            .get("cells")
            .and_then(|p| p.value.as_int())
            .ok_or_else(|| ToolFailure::error("cells not bound"))?;

        let grid = parameters
            .get("grid")
            .and_then(|p| p.value.as_object())
            .and_then(|id| ctx.store().get(id))
            .ok_or_else(|| ToolFailure::error("grid not bound"))?;

        for row in 0..cells {
            if !ctx.progress(row as f64 / cells as f64, "filling rows") {
                return Err(ToolFailure::Cancelled);
            }
        }

        let mut grid = grid
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        grid.set_name(format!("constant_{value}"));
        grid.set_attributes(json!({ "value": value, "cells": cells }));
        Ok(())
    }
}

/// Builds a table with a few named fields, handy for trying out
/// field-dependent choice parameters.
struct FieldTable {
    info: ToolInfo,
}

impl FieldTable {
    fn new() -> Self {
        Self {
            info: ToolInfo::new("field_table", "Field Table")
                .with_description("Create a table with the given field names")
                .with_category("Table|Generation"),
        }
    }
}

#[async_trait]
impl Tool for FieldTable {
    fn info(&self) -> &ToolInfo {
        &self.info
    }

    fn parameters(&self) -> ParameterList {
        ParameterList::new()
            .with(Parameter::text("fields", "Comma-separated field names"))
            .with(Parameter::output("table", "Output table", DataKind::Table))
    }

    async fn run(
        &self,
        parameters: &mut ParameterList,
        ctx: &ExecutionContext,
    ) -> std::result::Result<(), ToolFailure> {
        let fields: Vec<String> = parameters
            .get("fields")
            .and_then(|p| p.value.as_text())
            .ok_or_else(|| ToolFailure::error("fields not bound"))?
            .split(',')
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();

        let table = parameters
            .get("table")
            .and_then(|p| p.value.as_object())
            .and_then(|id| ctx.store().get(id))
            .ok_or_else(|| ToolFailure::error("table not bound"))?;

        if !ctx.progress(0.5, "writing fields") {
            return Err(ToolFailure::Cancelled);
        }

        let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
        table
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .set_fields(&refs);
        Ok(())
    }
}

/// The library shipped inside the binary.
pub fn library() -> ToolLibrary {
    ToolLibrary::new(LIBRARY_ID, env!("CARGO_PKG_VERSION"))
        .with_name("Demonstration Tools")
        .with_description("Built-in tools for trying out the runtime")
        .with_tool(Arc::new(ConstantGrid::new()))
        .with_tool(Arc::new(FieldTable::new()))
}

/// Factory table for resolving manifest tool symbols.
pub fn loader() -> ManifestLoader {
    ManifestLoader::new()
        .register("demo_constant_grid", Arc::new(|| {
            Arc::new(ConstantGrid::new()) as BoxedTool
        }))
        .register("demo_field_table", Arc::new(|| {
            Arc::new(FieldTable::new()) as BoxedTool
        }))
}
