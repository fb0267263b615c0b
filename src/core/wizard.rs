use super::error::{EngineError, Result};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum WizardStep {
    Entry,
    SafeCheck,
    GrowthType,
    GrowthMarket,
    StepRisk,
    ResultFamilyBonds,
    ResultStandardBonds,
    ResultEtf,
    ResultMix,
    ResultActive,
    ResultMetals,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum WizardOption {
    A,
    B,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Transition {
    pub next: WizardStep,
    pub progress: u8,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BackTarget {
    Step(WizardStep),
    Exit,
}

const fn to(next: WizardStep, progress: u8) -> Transition {
    Transition { next, progress }
}

impl WizardStep {
    pub const ENTRY: WizardStep = WizardStep::Entry;

    pub const ALL: [WizardStep; 11] = [
        WizardStep::Entry,
        WizardStep::SafeCheck,
        WizardStep::GrowthType,
        WizardStep::GrowthMarket,
        WizardStep::StepRisk,
        WizardStep::ResultFamilyBonds,
        WizardStep::ResultStandardBonds,
        WizardStep::ResultEtf,
        WizardStep::ResultMix,
        WizardStep::ResultActive,
        WizardStep::ResultMetals,
    ];

    pub fn id(self) -> &'static str {
        match self {
            WizardStep::Entry => "entry",
            WizardStep::SafeCheck => "safe-check",
            WizardStep::GrowthType => "growth-type",
            WizardStep::GrowthMarket => "growth-market",
            WizardStep::StepRisk => "step-risk",
            WizardStep::ResultFamilyBonds => "result-family-bonds",
            WizardStep::ResultStandardBonds => "result-standard-bonds",
            WizardStep::ResultEtf => "result-etf",
            WizardStep::ResultMix => "result-mix",
            WizardStep::ResultActive => "result-active",
            WizardStep::ResultMetals => "result-metals",
        }
    }

    pub fn from_id(id: &str) -> Option<WizardStep> {
        WizardStep::ALL.into_iter().find(|step| step.id() == id)
    }

    // Forward table, indexed by option. Terminal steps have no row.
    fn transitions(self) -> Option<[Transition; 2]> {
        use WizardStep::*;
        match self {
            Entry => Some([to(SafeCheck, 50), to(GrowthType, 40)]),
            SafeCheck => Some([to(ResultFamilyBonds, 100), to(ResultStandardBonds, 100)]),
            GrowthType => Some([to(GrowthMarket, 60), to(ResultMetals, 100)]),
            GrowthMarket => Some([to(StepRisk, 75), to(ResultActive, 100)]),
            StepRisk => Some([to(ResultMix, 100), to(ResultEtf, 100)]),
            ResultFamilyBonds | ResultStandardBonds | ResultEtf | ResultMix | ResultActive
            | ResultMetals => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.transitions().is_none()
    }

    pub fn options(self) -> &'static [WizardOption] {
        if self.is_terminal() {
            &[]
        } else {
            &[WizardOption::A, WizardOption::B]
        }
    }

    /// Progress shown while this step is on screen, whichever way it was reached.
    pub fn progress(self) -> u8 {
        match self {
            WizardStep::Entry => 10,
            WizardStep::SafeCheck => 50,
            WizardStep::GrowthType => 40,
            WizardStep::GrowthMarket => 60,
            WizardStep::StepRisk => 75,
            _ => 100,
        }
    }

    // One canonical predecessor per step. Not derived from the forward table.
    pub fn back_target(self) -> BackTarget {
        use WizardStep::*;
        match self {
            Entry => BackTarget::Exit,
            SafeCheck | GrowthType => BackTarget::Step(Entry),
            GrowthMarket => BackTarget::Step(GrowthType),
            StepRisk => BackTarget::Step(GrowthMarket),
            ResultFamilyBonds | ResultStandardBonds => BackTarget::Step(SafeCheck),
            ResultEtf | ResultMix => BackTarget::Step(StepRisk),
            ResultActive => BackTarget::Step(GrowthMarket),
            ResultMetals => BackTarget::Step(GrowthType),
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            WizardStep::Entry => "What is your approach?",
            WizardStep::SafeCheck => "Do you receive the 800+ child benefit?",
            WizardStep::GrowthType => "What do you want to invest in?",
            WizardStep::GrowthMarket => "How much time can you spend on markets?",
            WizardStep::StepRisk => "Your investments drop 25%. What do you do?",
            WizardStep::ResultFamilyBonds => "Family treasury bonds (ROS / ROD)",
            WizardStep::ResultStandardBonds => "Treasury bonds (EDO / COI)",
            WizardStep::ResultEtf => "Passive index funds and ETFs",
            WizardStep::ResultMix => "Hybrid portfolio of stocks and bonds",
            WizardStep::ResultActive => "Active stock picking through a broker",
            WizardStep::ResultMetals => "Physical gold and silver",
        }
    }

    pub fn option_label(self, option: WizardOption) -> Option<&'static str> {
        use WizardOption::{A, B};
        let label = match (self, option) {
            (WizardStep::Entry, A) => "Full safety, no risk of loss",
            (WizardStep::Entry, B) => "Building wealth, accepting risk",
            (WizardStep::SafeCheck, A) => "Yes",
            (WizardStep::SafeCheck, B) => "No",
            (WizardStep::GrowthType, A) => "Stocks, funds and ETFs",
            (WizardStep::GrowthType, B) => "Gold and silver",
            (WizardStep::GrowthMarket, A) => "Little time: set and forget",
            (WizardStep::GrowthMarket, B) => "Plenty of time: pick stocks myself",
            (WizardStep::StepRisk, A) => "I get nervous but want some growth",
            (WizardStep::StepRisk, B) => "I hold calmly and buy more",
            _ => return None,
        };
        Some(label)
    }
}

impl WizardOption {
    pub fn id(self) -> &'static str {
        match self {
            WizardOption::A => "a",
            WizardOption::B => "b",
        }
    }

    pub fn from_id(id: &str) -> Option<WizardOption> {
        match id.trim().to_ascii_lowercase().as_str() {
            "a" => Some(WizardOption::A),
            "b" => Some(WizardOption::B),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            WizardOption::A => 0,
            WizardOption::B => 1,
        }
    }
}

pub fn advance(current: WizardStep, option: WizardOption) -> Result<Transition> {
    current
        .transitions()
        .map(|row| row[option.index()])
        .ok_or_else(|| EngineError::InvalidTransition {
            step: current.id().to_string(),
            option: option.id().to_string(),
        })
}

pub fn back(current: WizardStep) -> BackTarget {
    current.back_target()
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NavigatorEvent {
    Moved(WizardStep),
    Exit,
}

/// Holds the single position of one wizard session.
#[derive(Debug, Clone)]
pub struct WizardNavigator {
    current: WizardStep,
    progress: u8,
}

impl Default for WizardNavigator {
    fn default() -> Self {
        Self::start()
    }
}

impl WizardNavigator {
    pub fn start() -> Self {
        Self {
            current: WizardStep::ENTRY,
            progress: WizardStep::ENTRY.progress(),
        }
    }

    pub fn current(&self) -> WizardStep {
        self.current
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn choose(&mut self, option: WizardOption) -> Result<Transition> {
        let transition = advance(self.current, option)?;
        self.current = transition.next;
        self.progress = transition.progress;
        Ok(transition)
    }

    // Leaving from the entry step is the caller's job; state stays as is.
    pub fn go_back(&mut self) -> NavigatorEvent {
        match back(self.current) {
            BackTarget::Step(step) => {
                self.current = step;
                self.progress = step.progress();
                NavigatorEvent::Moved(step)
            }
            BackTarget::Exit => NavigatorEvent::Exit,
        }
    }
}
