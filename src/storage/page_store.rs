use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::types::{
    PAGE_HEADER_SIZE, PAGE_SIZE, PageId,
    error::{DatabaseError, Result},
    page::{Page, PageHeader, PageKind},
};

/// Fixed-size page I/O over a single table file. Page N lives at byte
/// offset `(N - 1) * PAGE_SIZE`.
pub struct PageStore {
    path: PathBuf,
    file: File,
    page_count: u32,
}

impl PageStore {
    /// Create (or truncate) a table file holding one empty leaf page.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .read(true)
            .truncate(true)
            .open(path)?;
        file.write_all(&Page::new(1, PageKind::Leaf).to_bytes())?;
        file.flush()?;
        debug!(path = %path.display(), "created table file");
        Ok(Self {
            path: path.to_path_buf(),
            file,
            page_count: 1,
        })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let file_size = file.metadata()?.len();
        let page_count = (file_size / PAGE_SIZE as u64) as u32;
        if file_size % PAGE_SIZE as u64 != 0 || page_count == 0 {
            return Err(DatabaseError::CorruptedPage {
                page_id: page_count + 1,
                reason: format!("file size {} is not a positive multiple of {}", file_size, PAGE_SIZE),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            file,
            page_count,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    fn page_offset(&self, page_id: PageId) -> Result<u64> {
        if page_id == 0 || page_id > self.page_count {
            return Err(DatabaseError::CorruptedPage {
                page_id,
                reason: format!("page out of range 1..={}", self.page_count),
            });
        }
        Ok((page_id as u64 - 1) * PAGE_SIZE as u64)
    }

    pub fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        let mut buffer = vec![0u8; PAGE_SIZE];
        self.file.seek(SeekFrom::Start(self.page_offset(page_id)?))?;
        self.file.read_exact(&mut buffer)?;
        Page::from_bytes(page_id, &buffer)
    }

    pub fn write_page(&mut self, page: &Page) -> Result<()> {
        let page_bytes = page.to_bytes();
        self.file.seek(SeekFrom::Start(self.page_offset(page.page_id)?))?;
        self.file.write_all(&page_bytes)?;
        self.file.flush()?;
        Ok(())
    }

    pub fn read_header(&mut self, page_id: PageId) -> Result<PageHeader> {
        let mut buffer = [0u8; PAGE_HEADER_SIZE];
        self.file.seek(SeekFrom::Start(self.page_offset(page_id)?))?;
        self.file.read_exact(&mut buffer)?;
        PageHeader::from_bytes(page_id, &buffer)
    }

    pub fn write_header(&mut self, page_id: PageId, header: &PageHeader) -> Result<()> {
        self.file.seek(SeekFrom::Start(self.page_offset(page_id)?))?;
        self.file.write_all(&header.to_bytes())?;
        self.file.flush()?;
        Ok(())
    }

    /// Extend the file by one initialized page and return its number.
    pub fn allocate_page(&mut self, kind: PageKind) -> Result<PageId> {
        let new_page_id = self.page_count + 1;
        let new_page = Page::new(new_page_id, kind);
        self.file
            .seek(SeekFrom::Start((new_page_id as u64 - 1) * PAGE_SIZE as u64))?;
        self.file.write_all(&new_page.to_bytes())?;
        self.file.flush()?;
        self.page_count = new_page_id;
        debug!(page_id = new_page_id, ?kind, path = %self.path.display(), "allocated page");
        Ok(new_page_id)
    }

    pub fn set_next_page(&mut self, page_id: PageId, next_page: Option<PageId>) -> Result<()> {
        let mut header = self.read_header(page_id)?;
        header.next_page = next_page;
        self.write_header(page_id, &header)
    }

    /// First page of `kind` by page number.
    pub fn find_page_of_kind(&mut self, kind: PageKind) -> Result<Option<PageId>> {
        for page_id in 1..=self.page_count {
            if self.read_header(page_id)?.kind == kind {
                return Ok(Some(page_id));
            }
        }
        Ok(None)
    }

    /// Leaf pages in chain order, starting at page 1.
    pub fn leaf_chain(&mut self) -> Result<Vec<PageId>> {
        let mut chain = Vec::new();
        let mut next = Some(1);
        while let Some(page_id) = next {
            if chain.len() >= self.page_count as usize {
                return Err(DatabaseError::CorruptedPage {
                    page_id,
                    reason: "leaf chain revisits a page".to_string(),
                });
            }
            let header = self.read_header(page_id)?;
            if header.kind != PageKind::Leaf {
                return Err(DatabaseError::CorruptedPage {
                    page_id,
                    reason: "interior page linked into the leaf chain".to_string(),
                });
            }
            chain.push(page_id);
            next = header.next_page;
        }
        Ok(chain)
    }

    pub fn last_leaf(&mut self) -> Result<PageId> {
        let chain = self.leaf_chain()?;
        Ok(chain.last().copied().unwrap_or(1))
    }
}
