mod create_table_test;
mod predicate_test;
