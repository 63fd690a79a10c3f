// SPDX-FileCopyrightText: The padio authors
// SPDX-License-Identifier: MPL-2.0

use super::ProgramLayout;
use crate::{
    controller::{Context, Mode, ModeHandler},
    OutputResult,
};

/// Pattern editing.
///
/// Only uploads a dedicated layout. The pads and knobs are handled
/// by the pattern editor of the workstation through the regular MIDI
/// routing.
#[derive(Debug)]
pub struct PatternHandler {
    layout: &'static ProgramLayout,
}

impl PatternHandler {
    #[must_use]
    pub const fn new(layout: &'static ProgramLayout) -> Self {
        Self { layout }
    }
}

impl ModeHandler for PatternHandler {
    fn mode(&self) -> Mode {
        Mode::Pattern
    }

    fn activate(&mut self, ctx: &mut Context<'_>) -> OutputResult<()> {
        let tempo = ctx.app.tempo();
        ctx.upload_program(&self.layout.build(ctx.state, tempo))
    }

    fn deactivate(&mut self, _ctx: &mut Context<'_>) -> OutputResult<()> {
        Ok(())
    }
}
