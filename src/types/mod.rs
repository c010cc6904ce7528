pub mod error;
pub mod page;
pub mod row;
pub mod value;

// Common type aliases
pub type PageId = u32;
pub type RowId = u32;

// On-disk geometry
pub const PAGE_SIZE: usize = 512;
pub const PAGE_HEADER_SIZE: usize = 8; // kind(1) + cell_count(1) + free_offset(2) + next_page(4)
pub const CELL_POINTER_SIZE: usize = 2;
pub const NO_NEXT_PAGE: u32 = 0xFFFF_FFFF;

pub const LEAF_CELL_HEADER_SIZE: usize = 7; // len(2) + row_id(4) + column_count(1)
pub const INTERIOR_CELL_SIZE: usize = 8; // child_page(4) + max_row_id(4)

pub const TEXT_TYPE_CODE_BASE: u8 = 0x0C;
pub const MAX_TEXT_LENGTH: usize = (u8::MAX - TEXT_TYPE_CODE_BASE) as usize;
