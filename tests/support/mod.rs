pub mod parse_tree;
