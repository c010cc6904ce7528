use serde::{Deserialize, Serialize};

use crate::types::{
    CELL_POINTER_SIZE, INTERIOR_CELL_SIZE, NO_NEXT_PAGE, PAGE_HEADER_SIZE, PAGE_SIZE, PageId,
    RowId,
    error::{DatabaseError, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageKind {
    Interior = 0x05,
    Leaf = 0x0D,
}

impl PageKind {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0x05 => Ok(PageKind::Interior),
            0x0D => Ok(PageKind::Leaf),
            _ => Err(DatabaseError::InvalidPageType(value)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            PageKind::Interior => 0x05,
            PageKind::Leaf => 0x0D,
        }
    }
}

/*
 * Page Layout on Disk (512 bytes, big-endian)
 * ┌──────────────────────────────────────────────────────────────┐
 * │ kind(1) | cell_count(1) | free_space_offset(2) | next(4)     │
 * ├──────────────────────────────────────────────────────────────┤
 * │ CELL POINTER ARRAY: cell_count x offset(2), insertion order  │
 * ├──────────────────────────────────────────────────────────────┤
 * │                         FREE SPACE                           │
 * ├──────────────────────────────────────────────────────────────┤
 * │ CELL DATA: [...cell N...] ... [...cell 1...] [...cell 0...]  │
 * └──────────────────────────────────────────────────────────────┘
 *
 * free_space_offset is a high-water mark: it only moves towards the
 * header, deleted cells leave their bytes behind.
 */

#[derive(Debug, Clone, PartialEq)]
pub struct PageHeader {
    pub kind: PageKind,
    pub cell_count: u8,
    pub free_space_offset: u16,
    pub next_page: Option<PageId>,
}

impl PageHeader {
    pub fn new(kind: PageKind) -> Self {
        Self {
            kind,
            cell_count: 0,
            free_space_offset: PAGE_SIZE as u16,
            next_page: None,
        }
    }

    pub fn to_bytes(&self) -> [u8; PAGE_HEADER_SIZE] {
        let mut buffer = [0u8; PAGE_HEADER_SIZE];
        buffer[0] = self.kind.as_u8();
        buffer[1] = self.cell_count;
        buffer[2..4].copy_from_slice(&self.free_space_offset.to_be_bytes());
        let next = self.next_page.unwrap_or(NO_NEXT_PAGE);
        buffer[4..8].copy_from_slice(&next.to_be_bytes());
        buffer
    }

    pub fn from_bytes(page_id: PageId, bytes: &[u8]) -> Result<Self> {
        if bytes.len() < PAGE_HEADER_SIZE {
            return Err(DatabaseError::CorruptedPage {
                page_id,
                reason: format!("header needs {} bytes, got {}", PAGE_HEADER_SIZE, bytes.len()),
            });
        }

        let kind = PageKind::from_u8(bytes[0])?;
        let cell_count = bytes[1];
        let free_space_offset = u16::from_be_bytes([bytes[2], bytes[3]]);
        let next_raw = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let next_page = if next_raw == NO_NEXT_PAGE {
            None
        } else {
            Some(next_raw)
        };

        let pointer_end = PAGE_HEADER_SIZE + cell_count as usize * CELL_POINTER_SIZE;
        if free_space_offset as usize > PAGE_SIZE || (free_space_offset as usize) < pointer_end {
            return Err(DatabaseError::CorruptedPage {
                page_id,
                reason: format!(
                    "free space offset {} outside [{}, {}]",
                    free_space_offset, pointer_end, PAGE_SIZE
                ),
            });
        }

        Ok(Self {
            kind,
            cell_count,
            free_space_offset,
            next_page,
        })
    }

    /// Fixed header plus the cell pointer array.
    pub fn header_size(&self) -> usize {
        PAGE_HEADER_SIZE + self.cell_count as usize * CELL_POINTER_SIZE
    }

    pub fn free_space(&self) -> usize {
        let used_data_space = PAGE_SIZE - self.free_space_offset as usize;
        PAGE_SIZE.saturating_sub(self.header_size() + used_data_space)
    }

    pub fn can_fit(&self, cell_len: usize) -> bool {
        cell_len + CELL_POINTER_SIZE <= self.free_space()
    }
}

/// Child pointer recorded in the interior page when a leaf splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteriorCell {
    pub child_page: PageId,
    pub max_row_id: RowId,
}

impl InteriorCell {
    pub fn new(child_page: PageId, max_row_id: RowId) -> Self {
        Self {
            child_page,
            max_row_id,
        }
    }

    pub fn to_bytes(&self) -> [u8; INTERIOR_CELL_SIZE] {
        let mut bytes = [0u8; INTERIOR_CELL_SIZE];
        bytes[0..4].copy_from_slice(&self.child_page.to_be_bytes());
        bytes[4..8].copy_from_slice(&self.max_row_id.to_be_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < INTERIOR_CELL_SIZE {
            return Err(DatabaseError::SerializationError {
                details: format!("interior cell needs {} bytes, got {}", INTERIOR_CELL_SIZE, bytes.len()),
            });
        }
        Ok(Self {
            child_page: u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            max_row_id: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub page_id: PageId,
    pub kind: PageKind,
    pub next_page: Option<PageId>,
    pub free_space_offset: u16,
    pub cell_pointers: Vec<u16>,

    // Full page image; cells live in data[free_space_offset..]
    pub data: Vec<u8>,
}

impl Page {
    pub fn new(page_id: PageId, kind: PageKind) -> Self {
        Self {
            page_id,
            kind,
            next_page: None,
            free_space_offset: PAGE_SIZE as u16,
            cell_pointers: Vec::new(),
            data: vec![0; PAGE_SIZE],
        }
    }

    pub fn header(&self) -> PageHeader {
        PageHeader {
            kind: self.kind,
            cell_count: self.cell_count(),
            free_space_offset: self.free_space_offset,
            next_page: self.next_page,
        }
    }

    pub fn cell_count(&self) -> u8 {
        self.cell_pointers.len() as u8
    }

    /// Serialize the page to bytes following the documented layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = self.data.clone();
        buffer[..PAGE_HEADER_SIZE].copy_from_slice(&self.header().to_bytes());

        let mut offset = PAGE_HEADER_SIZE;
        for pointer in &self.cell_pointers {
            buffer[offset..offset + CELL_POINTER_SIZE].copy_from_slice(&pointer.to_be_bytes());
            offset += CELL_POINTER_SIZE;
        }

        // Slots vacated by pointer removal read back as zero
        buffer[offset..self.free_space_offset as usize].fill(0);

        buffer
    }

    /// Deserialize a page from bytes following the documented layout
    pub fn from_bytes(page_id: PageId, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PAGE_SIZE {
            return Err(DatabaseError::InvalidPageSize {
                expected: PAGE_SIZE,
                actual: bytes.len(),
            });
        }

        let header = PageHeader::from_bytes(page_id, bytes)?;

        let mut cell_pointers = Vec::with_capacity(header.cell_count as usize);
        let mut offset = PAGE_HEADER_SIZE;
        for _ in 0..header.cell_count {
            let pointer = u16::from_be_bytes([bytes[offset], bytes[offset + 1]]);
            if pointer < header.free_space_offset || pointer as usize >= PAGE_SIZE {
                return Err(DatabaseError::CorruptedPage {
                    page_id,
                    reason: format!("cell pointer {} outside the cell region", pointer),
                });
            }
            cell_pointers.push(pointer);
            offset += CELL_POINTER_SIZE;
        }

        Ok(Page {
            page_id,
            kind: header.kind,
            next_page: header.next_page,
            free_space_offset: header.free_space_offset,
            cell_pointers,
            data: bytes.to_vec(),
        })
    }

    pub fn free_space(&self) -> usize {
        self.header().free_space()
    }

    pub fn can_fit(&self, cell_len: usize) -> bool {
        self.header().can_fit(cell_len)
    }

    /// Write a cell below the high-water mark and append a pointer to it.
    pub fn insert_cell(&mut self, cell: &[u8]) -> Result<usize> {
        let offset = self.write_cell(cell)?;
        self.append_cell_pointer(offset);
        Ok(self.cell_pointers.len() - 1)
    }

    /// Write a new version of the cell in `slot` and repoint the slot at it.
    /// The old bytes stay where they are.
    pub fn replace_cell(&mut self, slot: usize, cell: &[u8]) -> Result<u16> {
        if slot >= self.cell_pointers.len() {
            return Err(DatabaseError::InvalidSlotIndex {
                index: slot,
                max: self.cell_pointers.len(),
            });
        }
        let offset = self.write_cell(cell)?;
        self.cell_pointers[slot] = offset;
        Ok(offset)
    }

    fn write_cell(&mut self, cell: &[u8]) -> Result<u16> {
        if !self.can_fit(cell.len()) {
            return Err(DatabaseError::PageFull {
                page_id: self.page_id,
            });
        }

        let new_offset = self.free_space_offset - cell.len() as u16;
        let start = new_offset as usize;
        self.data[start..start + cell.len()].copy_from_slice(cell);
        self.free_space_offset = new_offset;

        Ok(new_offset)
    }

    pub fn append_cell_pointer(&mut self, offset: u16) {
        self.cell_pointers.push(offset);
    }

    /// Drop the pointer at `index`, shifting later pointers left by one slot.
    pub fn remove_cell_pointer(&mut self, index: usize) -> Result<u16> {
        if index >= self.cell_pointers.len() {
            return Err(DatabaseError::InvalidSlotIndex {
                index,
                max: self.cell_pointers.len(),
            });
        }
        Ok(self.cell_pointers.remove(index))
    }

    /// Bytes from the cell at `slot` to the end of the page. Cells carry
    /// their own length, decoders read only what they need.
    pub fn cell(&self, slot: usize) -> Option<&[u8]> {
        self.cell_pointers
            .get(slot)
            .map(|&offset| &self.data[offset as usize..])
    }

    pub fn last_cell(&self) -> Option<&[u8]> {
        self.cell_pointers
            .len()
            .checked_sub(1)
            .and_then(|slot| self.cell(slot))
    }
}
