fn main() {
  cardano_forge::main();
}
