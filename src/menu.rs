//! Line-based query menu over a built family tree.

use std::io::{self, BufRead, Write};

use crate::genealogy::FamilyTree;

/// A query the user can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuCommand {
    /// Total number of people
    Total,
    /// People per birth decade
    ByDecade,
    /// Full names used more than once
    Duplicates,
    /// Tree overview
    Summary,
    Quit,
}

impl MenuCommand {
    pub fn all() -> &'static [MenuCommand] {
        &[
            MenuCommand::Total,
            MenuCommand::ByDecade,
            MenuCommand::Duplicates,
            MenuCommand::Summary,
            MenuCommand::Quit,
        ]
    }

    /// Parse a command letter, ignoring case and surrounding whitespace.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_uppercase().as_str() {
            "T" => Some(MenuCommand::Total),
            "D" => Some(MenuCommand::ByDecade),
            "N" => Some(MenuCommand::Duplicates),
            "S" => Some(MenuCommand::Summary),
            "Q" => Some(MenuCommand::Quit),
            _ => None,
        }
    }

    pub fn key(&self) -> char {
        match self {
            MenuCommand::Total => 'T',
            MenuCommand::ByDecade => 'D',
            MenuCommand::Duplicates => 'N',
            MenuCommand::Summary => 'S',
            MenuCommand::Quit => 'Q',
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MenuCommand::Total => "total people",
            MenuCommand::ByDecade => "total people by decade (birth decade)",
            MenuCommand::Duplicates => "duplicate full names",
            MenuCommand::Summary => "tree summary",
            MenuCommand::Quit => "quit",
        }
    }
}

/// Render the answer to a query. `Quit` renders as a farewell.
pub fn render(tree: &FamilyTree, command: MenuCommand) -> String {
    match command {
        MenuCommand::Total => format!("Total people: {}\n", tree.total_people()),
        MenuCommand::ByDecade => {
            let mut out = String::new();
            for (decade, count) in tree.total_people_by_decade() {
                out.push_str(&format!("{}s: {}\n", decade, count));
            }
            out
        }
        MenuCommand::Duplicates => {
            let duplicates = tree.duplicate_full_names();
            if duplicates.is_empty() {
                return "No duplicate full names found.\n".to_string();
            }
            let mut out = String::new();
            for (name, count) in duplicates {
                out.push_str(&format!("{}: {}\n", name, count));
            }
            out
        }
        MenuCommand::Summary => format!("{}\n", tree.summary()),
        MenuCommand::Quit => "Bye!\n".to_string(),
    }
}

fn write_help<W: Write>(output: &mut W) -> io::Result<()> {
    writeln!(output, "Commands:")?;
    for command in MenuCommand::all() {
        writeln!(output, "  {}  -> {}", command.key(), command.description())?;
    }
    writeln!(output)
}

/// Read commands from `input` until `Q` or end of input.
pub fn run_query_menu<R: BufRead, W: Write>(
    tree: &FamilyTree,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    write_help(output)?;

    let mut line = String::new();
    loop {
        write!(output, "Enter command (T/D/N/S/Q): ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(());
        }

        match MenuCommand::parse(&line) {
            Some(MenuCommand::Quit) => {
                write!(output, "{}", render(tree, MenuCommand::Quit))?;
                return Ok(());
            }
            Some(command) => write!(output, "{}", render(tree, command))?,
            None => writeln!(output, "Invalid command. Use T, D, N, S, or Q.")?,
        }
    }
}

/// Print every report once, for non-interactive runs.
pub fn print_all<W: Write>(tree: &FamilyTree, output: &mut W) -> io::Result<()> {
    for command in [MenuCommand::Summary, MenuCommand::Total, MenuCommand::ByDecade, MenuCommand::Duplicates] {
        writeln!(output, "== {} ==", command.description())?;
        write!(output, "{}", render(tree, command))?;
        writeln!(output)?;
    }
    Ok(())
}
