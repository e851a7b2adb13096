//! Status icons shared by the terminal output.

use console::Emoji;

pub static CHECK: Emoji<'_, '_> = Emoji("✓ ", "[OK] ");
pub static CROSS: Emoji<'_, '_> = Emoji("✗ ", "[ERR] ");
pub static SKIP: Emoji<'_, '_> = Emoji("⏭ ", "[SKIP] ");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "* ");
pub static RUNNING: Emoji<'_, '_> = Emoji("▶ ", "[>] ");
pub static CLOCK: Emoji<'_, '_> = Emoji("⏱ ", "[T] ");
