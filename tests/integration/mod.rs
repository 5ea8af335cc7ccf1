//! Integration tests for relgen

mod helpers;
mod test_all;
mod test_index;
mod test_list;
mod test_tag;
