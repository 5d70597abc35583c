mod composer;
mod message_list;
mod suggestion_grid;

pub use composer::Composer;
pub use message_list::MessageList;
pub use suggestion_grid::SuggestionGrid;
