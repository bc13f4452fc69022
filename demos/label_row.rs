//! Label Row Example - truncating rows of labels with a "+N" indicator
//!
//! Several rows of labels share one width. Narrow the rows and watch trailing
//! labels collapse into the indicator; widen them and they come back.
//!
//! Keys:
//! - Left / Right: row width
//! - Up / Down: labels per row
//! - q, Esc, Ctrl+C: quit
//!
//! Set `SPARK_TRUNCATE_LOG=/tmp/truncate.log` (plus `RUST_LOG=spark_truncate=trace`)
//! to capture engine logs; the terminal itself belongs to the UI.
//!
//! Run with: cargo run --example label_row

use std::error::Error;
use std::io::{self, Write};
use std::sync::Mutex;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use spark_truncate::{
    char_width, detect_terminal_size, Host, LabelRow, TruncateOptions, TRUNCATE_INDICATOR_ATTR,
};
use tracing_subscriber::EnvFilter;

const NAMES: [&str; 20] = [
    "Bug",
    "Feature",
    "Improvement",
    "Documentation",
    "Design",
    "Question",
    "Security",
    "Performance",
    "Testing",
    "Refactor",
    "Enhancement",
    "Critical",
    "High Priority",
    "Low Priority",
    "Blocked",
    "In Progress",
    "Ready",
    "Review",
    "Approved",
    "Deployed",
];

const ROWS: usize = 4;
const FIRST_LINE: u16 = 3;
const MAX_FRAMES_PER_EVENT: usize = 8;

struct Demo {
    host: Host,
    rows: Vec<LabelRow>,
    width: u16,
    labels: usize,
}

impl Demo {
    fn new(host: &Host, width: u16, labels: usize) -> spark_truncate::Result<Self> {
        let rows = (0..ROWS)
            .map(|row| {
                LabelRow::new(
                    host,
                    host.root(),
                    width,
                    (0..labels).map(|i| label_for(row, i)),
                    TruncateOptions::default(),
                )
            })
            .collect::<spark_truncate::Result<Vec<_>>>()?;
        Ok(Self {
            host: host.clone(),
            rows,
            width,
            labels,
        })
    }

    fn set_width(&mut self, width: u16) -> spark_truncate::Result<()> {
        self.width = width;
        for row in &self.rows {
            row.set_width(width)?;
        }
        Ok(())
    }

    fn add_label(&mut self) -> spark_truncate::Result<()> {
        if self.labels >= NAMES.len() {
            return Ok(());
        }
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.push_label(label_for(index, self.labels))?;
        }
        self.labels += 1;
        Ok(())
    }

    fn remove_label(&mut self) -> spark_truncate::Result<()> {
        if self.labels == 0 {
            return Ok(());
        }
        self.labels -= 1;
        for row in &mut self.rows {
            row.remove_label(self.labels)?;
        }
        Ok(())
    }
}

fn label_for(row: usize, index: usize) -> String {
    NAMES[(row * 3 + index) % NAMES.len()].to_string()
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging()?;

    let (columns, lines) = detect_terminal_size();
    let host = Host::new(columns, lines)?;
    let mut demo = Demo::new(&host, columns.saturating_sub(20).clamp(10, 60), 8)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

    let result = run(&mut stdout, &mut demo);

    execute!(stdout, cursor::Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn init_logging() -> Result<(), Box<dyn Error>> {
    let Ok(path) = std::env::var("SPARK_TRUNCATE_LOG") else {
        return Ok(());
    };
    let file = std::fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(out: &mut impl Write, demo: &mut Demo) -> Result<(), Box<dyn Error>> {
    loop {
        demo.host.settle(MAX_FRAMES_PER_EVENT)?;
        draw(out, demo)?;

        match event::read()? {
            Event::Key(KeyEvent {
                code, modifiers, ..
            }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
                KeyCode::Left => demo.set_width(demo.width.saturating_sub(1).max(1))?,
                KeyCode::Right => {
                    let (columns, _) = demo.host.with_document(|doc| doc.viewport());
                    demo.set_width((demo.width + 1).min(columns))?;
                }
                KeyCode::Up => demo.add_label()?,
                KeyCode::Down => demo.remove_label()?,
                _ => {}
            },
            Event::Resize(columns, lines) => demo.host.set_viewport(columns, lines)?,
            _ => {}
        }
    }
}

/// One visible piece of a row, ready to print.
struct Cell {
    x: u16,
    text: String,
    indicator: bool,
}

fn draw(out: &mut impl Write, demo: &Demo) -> Result<(), Box<dyn Error>> {
    queue!(
        out,
        Clear(ClearType::All),
        cursor::MoveTo(0, 0),
        SetAttribute(Attribute::Bold),
        Print(format!(
            "width {}  labels {}  (←/→ width, ↑/↓ labels, q quit)",
            demo.width, demo.labels
        )),
        SetAttribute(Attribute::Reset),
    )?;

    for (index, row) in demo.rows.iter().enumerate() {
        let line = FIRST_LINE + index as u16 * 2;
        let (right, cells) = demo.host.with_document_mut(|doc| -> spark_truncate::Result<_> {
            let container = doc.bounding_client_rect(row.container())?;
            let mut cells = Vec::new();
            for child in doc.children(row.container())? {
                let rect = doc.bounding_client_rect(child)?;
                if rect.width <= 0.0 {
                    continue;
                }
                cells.push(Cell {
                    // Labels carry one cell of padding on each side.
                    x: rect.x as u16 + 1,
                    text: doc.text(child)?.unwrap_or_default().to_string(),
                    indicator: doc.has_attribute(child, TRUNCATE_INDICATOR_ATTR)?,
                });
            }
            Ok((container.right() as u16, cells))
        })?;

        for cell in cells {
            let color = if cell.indicator { Color::Yellow } else { Color::Cyan };
            queue!(
                out,
                cursor::MoveTo(cell.x, line),
                SetForegroundColor(color),
                Print(clip(&cell.text, right.saturating_sub(cell.x))),
                ResetColor,
            )?;
        }
        queue!(
            out,
            cursor::MoveTo(right, line),
            SetForegroundColor(Color::DarkGrey),
            Print(format!("│ hidden {}", row.overflow_count())),
            ResetColor,
        )?;
    }

    out.flush()?;
    Ok(())
}

/// Cut `text` to at most `max` display columns.
fn clip(text: &str, max: u16) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|&c| {
            used += char_width(c);
            used <= max
        })
        .collect()
}
