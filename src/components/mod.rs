pub mod bipartite_graph;
pub mod controls;
pub mod notice;
pub mod save_load;
