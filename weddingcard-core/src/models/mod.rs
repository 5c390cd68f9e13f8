mod guest;
mod patch;
mod theme;
mod wedding;

pub use guest::{Attendance, GuestbookEntry, NewGuestbookEntry, NewRsvp, Rsvp};
pub use patch::{PatchError, WeddingPatch, TEXT_FIELDS};
pub use theme::Theme;
pub use wedding::{
    Faq, GalleryPhoto, PartyMember, ScheduleEvent, StoryEvent, WeddingDetails, WeddingRecord,
    CEREMONY_HOUR,
};
