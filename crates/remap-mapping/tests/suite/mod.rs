mod checker;
mod persistence;
