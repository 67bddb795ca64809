use pseudolang::codegen;

fn render(source: &str) -> String {
    codegen::render(&pseudolang::compile(source).expect("compile should succeed"))
}

#[test]
fn factorial_translation() {
    let source = include_str!("../fixtures/factorial.pseudo");
    let expected = "\
#!/usr/bin/env python3
# -*- coding: utf-8 -*-
# Generated automatically from pseudocode

def main():
    n = 10
    resultado = 1
    while n > 1:
        resultado = resultado * n
        n = n - 1
    print(resultado)


if __name__ == '__main__':
    main()
";
    assert_eq!(render(source), expected);
}

#[test]
fn fizzbuzz_translation_nests_if_else() {
    let python = render(include_str!("../fixtures/fizzbuzz.pseudo"));
    let expected_body = "\
def main():
    i = 1
    while i <= 15:
        if (i % 15) == 0:
            print(\"FizzBuzz\")
        else:
            if (i % 3) == 0:
                print(\"Fizz\")
            else:
                if (i % 5) == 0:
                    print(\"Buzz\")
                else:
                    print(i)
        i = i + 1
";
    assert!(python.contains(expected_body), "{python}");
}

#[test]
fn logic_translation_uses_python_operators() {
    let python = render(include_str!("../fixtures/logic.pseudo"));
    assert!(python.contains("    if (x > 1) and (x < 10):\n"), "{python}");
    assert!(python.contains("    if (x < 1) or (x == 5):\n"), "{python}");
    assert!(python.contains("    if not (x == 3):\n"), "{python}");
    assert!(python.contains("    if \"\":\n"), "{python}");
    assert!(python.contains("    if 0.0:\n"), "{python}");
}

#[test]
fn empty_program_has_no_entry_point() {
    let python = render("");
    assert!(!python.contains("def main"));
    assert!(!python.contains("__main__"));
}

#[test]
fn rendering_twice_is_identical() {
    let program =
        pseudolang::compile(include_str!("../fixtures/scoping.pseudo")).expect("compile");
    assert_eq!(codegen::render(&program), codegen::render(&program));
}
