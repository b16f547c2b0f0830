mod bridges;
mod build;
mod combined;
mod references;
mod resolver;
