// src/cli/display.rs
use crate::domain::bookmark::Bookmark;
use crate::infrastructure::http::UrlStatus;
use std::io::{self, Write};
use termcolor::{Color, ColorSpec, WriteColor};

/// `title<TAB>uri` per bookmark
pub fn write_bookmarks_as_text<W: Write>(out: &mut W, bookmarks: &[Bookmark]) -> io::Result<()> {
    for bookmark in bookmarks {
        writeln!(out, "{}\t{}", bookmark.title, bookmark.uri)?;
    }
    out.flush()
}

/// One line per unreachable bookmark: `status<TAB>uri<TAB>title`
pub fn write_unreachable<W: Write>(out: &mut W, bookmark: &Bookmark, status: &UrlStatus) -> io::Result<()> {
    let label = match status {
        UrlStatus::Reachable(_) => return Ok(()),
        UrlStatus::Status(code) => code.to_string(),
        UrlStatus::Failed(_) => "ERR".to_string(),
    };
    writeln!(out, "{}\t{}\t{}", label, bookmark.uri, bookmark.title)
}

/// Colored summary line on the human channel
pub fn write_check_summary<W: WriteColor>(out: &mut W, checked: usize, unreachable: usize) -> io::Result<()> {
    let color = if unreachable == 0 { Color::Green } else { Color::Yellow };
    out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    writeln!(
        out,
        "Checked {} bookmarks, {} unreachable",
        checked, unreachable
    )?;
    out.reset()
}
