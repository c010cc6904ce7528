mod catalog_test;
