use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A game action the player can issue for a unit against a territory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    Deploy,
    Undeploy,
    Move,
    Heal,
    Collect,
    Drop,
    Camp,
    Uncamp,
}

impl CommandKind {
    /// All commands in display order.
    pub fn all() -> &'static [CommandKind] {
        &[
            Self::Deploy,
            Self::Undeploy,
            Self::Move,
            Self::Heal,
            Self::Collect,
            Self::Drop,
            Self::Camp,
            Self::Uncamp,
        ]
    }

    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Deploy => "Deploy",
            Self::Undeploy => "Undeploy",
            Self::Move => "Move",
            Self::Heal => "Heal",
            Self::Collect => "Collect",
            Self::Drop => "Drop",
            Self::Camp => "Camp",
            Self::Uncamp => "Uncamp",
        }
    }

    /// The single-bit set for this command.
    pub const fn flag(&self) -> CommandSet {
        match self {
            Self::Deploy => CommandSet::DEPLOY,
            Self::Undeploy => CommandSet::UNDEPLOY,
            Self::Move => CommandSet::MOVE,
            Self::Heal => CommandSet::HEAL,
            Self::Collect => CommandSet::COLLECT,
            Self::Drop => CommandSet::DROP,
            Self::Camp => CommandSet::CAMP,
            Self::Uncamp => CommandSet::UNCAMP,
        }
    }
}

bitflags! {
    /// Set of enabled commands. Bit order matches `CommandKind::all()`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CommandSet: u8 {
        const DEPLOY = 0b0000_0001;
        const UNDEPLOY = 0b0000_0010;
        const MOVE = 0b0000_0100;
        const HEAL = 0b0000_1000;
        const COLLECT = 0b0001_0000;
        const DROP = 0b0010_0000;
        const CAMP = 0b0100_0000;
        const UNCAMP = 0b1000_0000;
    }
}

impl CommandSet {
    /// Whether `kind` is enabled.
    pub fn allows(&self, kind: CommandKind) -> bool {
        self.contains(kind.flag())
    }

    /// Enable `kind` when `condition` holds.
    pub fn enable_if(&mut self, kind: CommandKind, condition: bool) {
        self.set(kind.flag(), condition);
    }

    /// Enabled commands in display order.
    pub fn kinds(&self) -> impl Iterator<Item = CommandKind> + '_ {
        CommandKind::all().iter().copied().filter(|kind| self.allows(*kind))
    }
}

impl FromIterator<CommandKind> for CommandSet {
    fn from_iter<I: IntoIterator<Item = CommandKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(CommandSet::empty(), |set, kind| set | kind.flag())
    }
}
