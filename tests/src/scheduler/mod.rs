mod inherit;
mod sjf;
