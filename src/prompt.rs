use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::core::{BondProduct, NavigatorEvent, WizardNavigator, WizardOption, WizardStep};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WizardOutcome {
    Finished(WizardStep),
    Exited,
}

enum Command {
    Choose(WizardOption),
    Back,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "back" | "<" => Some(Command::Back),
        "q" | "quit" | "exit" => Some(Command::Quit),
        other => WizardOption::from_id(other).map(Command::Choose),
    }
}

fn render_step<W: Write>(out: &mut W, step: WizardStep, progress: u8) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "[{progress:>3}%] {}", step.prompt())?;
    for option in step.options() {
        if let Some(label) = step.option_label(*option) {
            writeln!(out, "  {}) {label}", option.id())?;
        }
    }
    Ok(())
}

fn render_result<W: Write>(out: &mut W, step: WizardStep) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "[100%] Recommended: {}", step.prompt())?;
    if let Some(product) = BondProduct::simulator_for(step) {
        writeln!(
            out,
            "  Try it: kidfund bonds --product {}",
            product.code().to_ascii_lowercase()
        )?;
    }
    Ok(())
}

/// Runs the decision tree over a line-oriented terminal.
///
/// Accepts `a`/`b` to choose, `back` to step back and `quit` to leave.
/// Going back from the first question or reaching end of input exits.
pub fn run_wizard<R: BufRead, W: Write>(input: R, mut out: W) -> io::Result<WizardOutcome> {
    let mut nav = WizardNavigator::start();
    let mut lines = input.lines();

    loop {
        let step = nav.current();
        if step.is_terminal() {
            render_result(&mut out, step)?;
            return Ok(WizardOutcome::Finished(step));
        }
        render_step(&mut out, step, nav.progress())?;
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next().transpose()? else {
            return Ok(WizardOutcome::Exited);
        };

        match parse_command(&line) {
            Some(Command::Choose(option)) => {
                let transition = nav
                    .choose(option)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
                debug!(
                    from = step.id(),
                    to = transition.next.id(),
                    "wizard choice"
                );
            }
            Some(Command::Back) => {
                if nav.go_back() == NavigatorEvent::Exit {
                    return Ok(WizardOutcome::Exited);
                }
            }
            Some(Command::Quit) => return Ok(WizardOutcome::Exited),
            None => writeln!(out, "Please answer a or b (or back / quit).")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(script: &str) -> (WizardOutcome, String) {
        let mut out = Vec::new();
        let outcome = run_wizard(Cursor::new(script), &mut out).expect("in-memory io");
        (outcome, String::from_utf8(out).expect("utf8 output"))
    }

    #[test]
    fn safety_path_points_to_family_bonds() {
        let (outcome, text) = run("a\na\n");
        assert_eq!(outcome, WizardOutcome::Finished(WizardStep::ResultFamilyBonds));
        assert!(text.contains("[ 10%]"));
        assert!(text.contains("[ 50%]"));
        assert!(text.contains("--product rod"));
    }

    #[test]
    fn back_and_retry_reaches_other_branch() {
        let (outcome, text) = run("b\nback\na\nB\n");
        assert_eq!(
            outcome,
            WizardOutcome::Finished(WizardStep::ResultStandardBonds)
        );
        assert!(text.contains("[ 40%]"));
        assert!(text.contains("--product edo"));
    }

    #[test]
    fn garbage_is_reprompted_without_moving() {
        let (outcome, text) = run("maybe\nb\nb\n");
        assert_eq!(outcome, WizardOutcome::Finished(WizardStep::ResultMetals));
        assert!(text.contains("Please answer a or b"));
        assert!(!text.contains("Try it"));
    }

    #[test]
    fn back_from_entry_or_eof_exits() {
        assert_eq!(run("back\n").0, WizardOutcome::Exited);
        assert_eq!(run("b\na\n").0, WizardOutcome::Exited);
        assert_eq!(run("quit\n").0, WizardOutcome::Exited);
    }
}
