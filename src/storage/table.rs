use std::path::Path;

use tracing::{debug, warn};

use crate::{
    executor::predicate::Condition,
    storage::{
        catalog::SchemaProvider,
        page_store::PageStore,
        schema::TableSchema,
    },
    types::{
        CELL_POINTER_SIZE, INTERIOR_CELL_SIZE, PAGE_HEADER_SIZE, PAGE_SIZE, PageId, RowId,
        error::{DatabaseError, Result},
        page::{InteriorCell, Page, PageKind},
        row::Row,
        value::{DataType, Value},
    },
};

/// Location of a decoded record: the page, its slot in the pointer array and
/// the offset that slot held when the record was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordHandle {
    pub page_id: PageId,
    pub slot: usize,
    pub offset: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub handle: RecordHandle,
    pub row: Row,
}

/// A parsed `column = value` assignment, keyed by schema position.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column_index: usize,
    pub value: Value,
}

/// One table file, opened for the duration of a single operation.
///
/// Reads walk the leaf chain from page 1 by next-page link. The interior
/// page written by splits is bookkeeping only and is never followed.
pub struct Table {
    schema: TableSchema,
    data_types: Vec<DataType>,
    store: PageStore,
}

impl Table {
    /// Create an empty table file: a single leaf page.
    pub fn create_file<P: AsRef<Path>>(path: P) -> Result<()> {
        PageStore::create(path)?;
        Ok(())
    }

    pub fn open<P: AsRef<Path>>(
        path: P,
        table_name: &str,
        schemas: &dyn SchemaProvider,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DatabaseError::TableNotFound {
                name: table_name.to_string(),
            });
        }
        let store = PageStore::open(path)?;
        let schema = schemas.resolve_schema(table_name)?;
        Ok(Self::with_schema(store, schema))
    }

    pub fn with_schema(store: PageStore, schema: TableSchema) -> Self {
        let data_types = schema.data_types();
        Self {
            schema,
            data_types,
            store,
        }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.schema.table_name
    }

    pub fn page_count(&self) -> u32 {
        self.store.page_count()
    }

    /// Decode every live record along the leaf chain, keeping those that
    /// satisfy `condition`. Pointer-array order within a page, chain order
    /// across pages.
    pub fn scan(&mut self, condition: Option<&Condition>) -> Result<Vec<Record>> {
        let filter = match condition {
            Some(condition) => Some((condition, condition.column_index(&self.schema)?)),
            None => None,
        };

        let mut records = Vec::new();
        for page_id in self.store.leaf_chain()? {
            let page = self.store.read_page(page_id)?;
            for (slot, &offset) in page.cell_pointers.iter().enumerate() {
                let row = Row::from_cell_bytes(&page.data[offset as usize..], &self.data_types)?;

                if let Some((condition, index)) = filter {
                    let matches = match row.column_value(index) {
                        Some(value) => condition.evaluate(&value)?,
                        None => false,
                    };
                    if !matches {
                        continue;
                    }
                }

                records.push(Record {
                    handle: RecordHandle {
                        page_id,
                        slot,
                        offset,
                    },
                    row,
                });
            }
        }
        Ok(records)
    }

    /// Live records across the whole leaf chain.
    pub fn record_count(&mut self) -> Result<usize> {
        let mut total = 0;
        for page_id in self.store.leaf_chain()? {
            total += self.store.read_header(page_id)?.cell_count as usize;
        }
        Ok(total)
    }

    /// Row id for the next insert: one past the larger of the last-written
    /// row id in the final leaf and the live record count. An empty final
    /// leaf restarts at 1.
    pub fn next_row_id(&mut self) -> Result<RowId> {
        let last_leaf = self.store.last_leaf()?;
        let page = self.store.read_page(last_leaf)?;
        let Some(last_cell) = page.last_cell() else {
            return Ok(1);
        };
        let last_row_id = Row::peek_row_id(last_cell)?;
        let total = self.record_count()? as RowId;
        Ok(last_row_id.max(total) + 1)
    }

    /// Insert a row from parallel column/literal lists. Columns left out must
    /// be nullable. A value given for `row_id` is ignored; the engine assigns
    /// row ids.
    pub fn insert(&mut self, columns: &[&str], values: &[&str]) -> Result<RowId> {
        if columns.len() != values.len() {
            return Err(DatabaseError::ValueCountMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }

        let mut supplied: Vec<Option<&str>> = vec![None; self.schema.columns.len()];
        for (column, literal) in columns.iter().zip(values) {
            let index = self.schema.require_column_index(column)?;
            supplied[index] = Some(*literal);
        }

        let mut row_values = Vec::with_capacity(self.data_types.len());
        for (index, column) in self.schema.columns.iter().enumerate().skip(1) {
            let value = match supplied[index] {
                Some(literal) => Value::parse(literal, column.data_type)?,
                None => Value::Null,
            };
            if value.is_null() && !column.nullable {
                return Err(DatabaseError::NotNullViolation {
                    column: column.name.clone(),
                });
            }
            row_values.push(value);
        }

        // Row id is settled before any split: a fresh leaf would restart it.
        let row = Row::new(self.next_row_id()?, row_values);
        let cell = self.encode_cell(&row)?;

        let last_leaf = self.store.last_leaf()?;
        let mut page = self.store.read_page(last_leaf)?;
        if !page.can_fit(cell.len()) {
            let new_leaf = self.split_leaf(last_leaf)?;
            page = self.store.read_page(new_leaf)?;
        }
        page.insert_cell(&cell)?;
        self.store.write_page(&page)?;

        debug!(table = %self.name(), row_id = row.row_id, page_id = page.page_id, "inserted record");
        Ok(row.row_id)
    }

    /// Resolve and parse `column = literal` pairs against the schema.
    pub fn prepare_assignments(&self, columns: &[&str], values: &[&str]) -> Result<Vec<Assignment>> {
        if columns.len() != values.len() {
            return Err(DatabaseError::ValueCountMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }

        columns
            .iter()
            .zip(values)
            .map(|(column, literal)| {
                let column_index = self.schema.require_column_index(column)?;
                if column_index == 0 {
                    return Err(DatabaseError::ImmutableRowId);
                }
                let schema_column = &self.schema.columns[column_index];
                let value = Value::parse(literal, schema_column.data_type)?;
                if value.is_null() && !schema_column.nullable {
                    return Err(DatabaseError::NotNullViolation {
                        column: schema_column.name.clone(),
                    });
                }
                Ok(Assignment {
                    column_index,
                    value,
                })
            })
            .collect()
    }

    pub fn update(&mut self, handle: RecordHandle, columns: &[&str], values: &[&str]) -> Result<RecordHandle> {
        let assignments = self.prepare_assignments(columns, values)?;
        self.apply_update(handle, &assignments)
    }

    /// Rewrite the record behind `handle` with `assignments` merged in.
    ///
    /// If the new cell fits the record's page it is written there and the
    /// same slot is repointed at it. Otherwise the page is split and the
    /// record moves to the new leaf, keeping its row id.
    pub fn apply_update(&mut self, handle: RecordHandle, assignments: &[Assignment]) -> Result<RecordHandle> {
        let mut page = self.store.read_page(handle.page_id)?;
        self.check_handle(&page, handle)?;

        let mut row = Row::from_cell_bytes(&page.data[handle.offset as usize..], &self.data_types)?;
        for assignment in assignments {
            row.values[assignment.column_index - 1] = assignment.value.clone();
        }
        let cell = self.encode_cell(&row)?;

        if page.can_fit(cell.len()) {
            let offset = page.replace_cell(handle.slot, &cell)?;
            self.store.write_page(&page)?;
            return Ok(RecordHandle { offset, ..handle });
        }

        let new_leaf = self.split_leaf(handle.page_id)?;

        // The split rewrote this page's header; work from a fresh copy.
        let mut source = self.store.read_page(handle.page_id)?;
        source.remove_cell_pointer(handle.slot)?;
        self.store.write_page(&source)?;

        let mut target = self.store.read_page(new_leaf)?;
        let slot = target.insert_cell(&cell)?;
        self.store.write_page(&target)?;

        debug!(table = %self.name(), row_id = row.row_id, from = handle.page_id, to = new_leaf, "relocated record");
        Ok(RecordHandle {
            page_id: new_leaf,
            slot,
            offset: target.cell_pointers[slot],
        })
    }

    /// Drop the record's pointer. Its bytes stay in the cell region and the
    /// page's free-space offset does not move.
    pub fn delete(&mut self, handle: RecordHandle) -> Result<()> {
        let mut page = self.store.read_page(handle.page_id)?;
        self.check_handle(&page, handle)?;
        page.remove_cell_pointer(handle.slot)?;
        self.store.write_page(&page)
    }

    /// Update every record matching `condition`; returns how many changed.
    pub fn update_where(&mut self, columns: &[&str], values: &[&str], condition: Option<&Condition>) -> Result<usize> {
        let assignments = self.prepare_assignments(columns, values)?;
        let handles = self.matching_handles(condition)?;
        for handle in &handles {
            self.apply_update(*handle, &assignments)?;
        }
        Ok(handles.len())
    }

    /// Delete every record matching `condition`; returns how many went.
    pub fn delete_where(&mut self, condition: Option<&Condition>) -> Result<usize> {
        let handles = self.matching_handles(condition)?;
        for handle in &handles {
            self.delete(*handle)?;
        }
        Ok(handles.len())
    }

    // Highest slot first, so removing a pointer never shifts one still pending.
    fn matching_handles(&mut self, condition: Option<&Condition>) -> Result<Vec<RecordHandle>> {
        let mut handles: Vec<RecordHandle> = self
            .scan(condition)?
            .into_iter()
            .map(|record| record.handle)
            .collect();
        handles.sort_unstable_by(|a, b| b.cmp(a));
        Ok(handles)
    }

    /// Give `full_page` a successor leaf and return it.
    ///
    /// The first split allocates the interior page followed by the new leaf;
    /// later splits reuse the interior page. Either way a
    /// `(full_page, top row id)` cell is recorded there and the interior
    /// page's next link is pointed at the new leaf. The new leaf takes over
    /// `full_page`'s old successor, so the chain stays intact when a page in
    /// the middle splits.
    pub fn split_leaf(&mut self, full_page: PageId) -> Result<PageId> {
        let top_row_id = self.top_row_id(full_page)?;
        let old_successor = self.store.read_header(full_page)?.next_page;

        let interior = match self.store.find_page_of_kind(PageKind::Interior)? {
            Some(interior) => interior,
            None => self.store.allocate_page(PageKind::Interior)?,
        };
        self.record_child(interior, full_page, top_row_id)?;

        let new_leaf = self.store.allocate_page(PageKind::Leaf)?;
        self.store.set_next_page(interior, Some(new_leaf))?;
        self.store.set_next_page(new_leaf, old_successor)?;
        self.store.set_next_page(full_page, Some(new_leaf))?;

        debug!(table = %self.name(), full_page, interior, new_leaf, "split leaf page");
        Ok(new_leaf)
    }

    /// Row id of the last cell in the pointer array, 1 for an empty page.
    pub fn top_row_id(&mut self, page_id: PageId) -> Result<RowId> {
        let page = self.store.read_page(page_id)?;
        match page.last_cell() {
            Some(cell) => Row::peek_row_id(cell),
            None => Ok(1),
        }
    }

    /// Child pointers recorded in the interior page, in insertion order.
    pub fn interior_cells(&mut self) -> Result<Vec<InteriorCell>> {
        let Some(interior) = self.store.find_page_of_kind(PageKind::Interior)? else {
            return Ok(Vec::new());
        };
        let page = self.store.read_page(interior)?;
        (0..page.cell_pointers.len())
            .filter_map(|slot| page.cell(slot))
            .map(InteriorCell::from_bytes)
            .collect()
    }

    pub fn leaf_chain(&mut self) -> Result<Vec<PageId>> {
        self.store.leaf_chain()
    }

    pub fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        self.store.read_page(page_id)
    }

    fn record_child(&mut self, interior: PageId, child: PageId, max_row_id: RowId) -> Result<()> {
        let mut page = self.store.read_page(interior)?;
        if !page.can_fit(INTERIOR_CELL_SIZE) {
            warn!(table = %self.name(), interior, child, "interior page full, child pointer not recorded");
            return Ok(());
        }
        page.insert_cell(&InteriorCell::new(child, max_row_id).to_bytes())?;
        self.store.write_page(&page)
    }

    fn encode_cell(&self, row: &Row) -> Result<Vec<u8>> {
        let cell = row.to_cell_bytes(&self.data_types)?;
        if cell.len() + CELL_POINTER_SIZE > PAGE_SIZE - PAGE_HEADER_SIZE {
            return Err(DatabaseError::RecordTooLarge { size: cell.len() });
        }
        Ok(cell)
    }

    fn check_handle(&self, page: &Page, handle: RecordHandle) -> Result<()> {
        match page.cell_pointers.get(handle.slot) {
            Some(&offset) if offset == handle.offset && page.kind == PageKind::Leaf => Ok(()),
            _ => Err(DatabaseError::StaleRecordHandle {
                page_id: handle.page_id,
                slot: handle.slot,
                offset: handle.offset,
            }),
        }
    }
}
