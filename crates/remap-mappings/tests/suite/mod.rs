mod checker;
mod persistence;
mod translate;
