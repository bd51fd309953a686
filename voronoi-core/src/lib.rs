//! Core simulation and rendering pipeline for an animated Voronoi diagram.
//!
//! Main components:
//! - [`seed`] — moving seed points and the bounded seed set.
//! - [`field`] — per-pixel nearest-seed color field evaluation.
//! - [`edge`] — region-boundary overlay derived from a color field.
//! - [`compositor`] — final frame assembly (base layer + seed markers).
//! - [`command`] — discrete input commands and their application.
//! - [`phases`] — high-level per-tick pipeline phases.
//! - [`config`] — configuration and per-frame render parameters.
//! - [`palette`] — fixed seed color palette and shared colors.
//! - [`state`] — simulation state owned by the tick-loop driver.
//! - [`types`] — shared type aliases and IDs.

pub mod command;
pub mod compositor;
pub mod config;
pub mod edge;
pub mod field;
pub mod palette;
pub mod phases;
pub mod seed;
pub mod state;
pub mod types;
