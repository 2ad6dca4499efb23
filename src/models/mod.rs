pub mod announcement;
pub mod commands;
pub mod invite;
pub mod message;
pub mod stats;
pub mod team;
pub mod user;

pub use announcement::{Announcement, AnnouncementFilter, AnnouncementPatch, Priority};
pub use invite::{Invite, InviteFilter, InvitePatch, JoinCode};
pub use message::{Message, MessageFilter, MessageKind, MessagePatch};
pub use stats::{PlayerMatchStats, ReviewStatus, StatLine, StatsFilter, StatsPatch};
pub use team::{Team, TeamFilter, TeamPatch};
pub use user::{PlayerStatus, User, UserFilter, UserPatch, UserType};

use std::collections::HashSet;

/// Anything carrying a per-user read receipt set.
pub trait Readable {
    fn read_by(&self) -> &HashSet<String>;
}

impl Readable for Announcement {
    fn read_by(&self) -> &HashSet<String> {
        &self.read_by
    }
}

impl Readable for Message {
    fn read_by(&self) -> &HashSet<String> {
        &self.read_by
    }
}
